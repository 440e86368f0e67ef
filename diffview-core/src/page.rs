use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::PageError;

macro_rules! page_number {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u32", into = "u32")]
        pub struct $name(NonZeroU32);

        impl $name {
            pub const FIRST: Self = Self(NonZeroU32::MIN);
            // Navigation clamps this to the real last page.
            pub const LAST: Self = Self(NonZeroU32::MAX);

            pub fn new(number: u32) -> Option<Self> {
                NonZeroU32::new(number).map(Self)
            }

            pub fn from_index(index: usize) -> Option<Self> {
                u32::try_from(index)
                    .ok()
                    .and_then(|index| index.checked_add(1))
                    .and_then(Self::new)
            }

            pub fn get(self) -> u32 {
                self.0.get()
            }

            pub fn index(self) -> usize {
                (self.0.get() - 1) as usize
            }

            pub fn next(self) -> Self {
                Self(self.0.saturating_add(1))
            }

            pub fn prev(self) -> Self {
                Self::new(self.get() - 1).unwrap_or(Self::FIRST)
            }

            pub fn clamp_to(self, page_count: usize) -> Self {
                if page_count == 0 {
                    return self;
                }
                let last = u32::try_from(page_count).unwrap_or(u32::MAX);
                Self::new(self.get().min(last)).unwrap_or(Self::FIRST)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::FIRST
            }
        }

        impl TryFrom<u32> for $name {
            type Error = PageError;

            fn try_from(number: u32) -> Result<Self, Self::Error> {
                Self::new(number).ok_or(PageError::Zero)
            }
        }

        impl From<$name> for u32 {
            fn from(page: $name) -> u32 {
                page.get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

page_number!(
    PrimaryPage
);

page_number!(
    GuidelinePage
);
