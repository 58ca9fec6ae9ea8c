//! Element id generation for tab controls and panels.

use std::sync::atomic::{AtomicU64, Ordering};

use ag0_config::IdScheme;
use rand::RngExt;

/// Shared by every generator so ids stay unique across renderers.
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Ids for one tab control and its panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabIds {
    /// Id of the tab button.
    pub tab: String,
    /// Id of the tab panel.
    pub panel: String,
}

/// Generates `id` attribute values for tab controls and panels.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    scheme: IdScheme,
}

impl IdGenerator {
    /// Create a generator producing ids that start with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>, scheme: IdScheme) -> Self {
        Self {
            prefix: prefix.into(),
            scheme,
        }
    }

    /// Ids for the entry at `index` within its group.
    ///
    /// Sequential ids are `{prefix}-tab-{n}` / `{prefix}-panel-{n}` with `n`
    /// drawn from a process-wide counter. Random ids are
    /// `{prefix}-tab-{base36}-{index}`; collisions are improbable but not
    /// ruled out.
    #[must_use]
    pub fn next(&self, index: usize) -> TabIds {
        let prefix = &self.prefix;
        match self.scheme {
            IdScheme::Sequential => {
                let n = NEXT_ID.fetch_add(1, Ordering::Relaxed);
                TabIds {
                    tab: format!("{prefix}-tab-{n}"),
                    panel: format!("{prefix}-panel-{n}"),
                }
            }
            IdScheme::Random => TabIds {
                tab: format!("{prefix}-tab-{}-{index}", random_suffix()),
                panel: format!("{prefix}-panel-{}-{index}", random_suffix()),
            },
        }
    }
}

fn random_suffix() -> String {
    to_base36(rand::rng().random::<u64>())
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
