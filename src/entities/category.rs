//! Category entity - The garment types a record counts.
//!
//! Each category owns two persisted columns: the intake count (`Shirts`) and the
//! return count (`Shirts_Received`). `CategoryCounts` holds one count per category.

use std::fmt;

/// A garment type accepted at the counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Regular shirts for ironing
    Shirts,
    /// Trousers
    Pants,
    /// T-shirts
    TShirts,
    /// Sarees
    Sarees,
    /// Dresses
    Dresses,
    /// Shirts and blazers sent for dry cleaning
    DryCleanShirts,
    /// Anything else (added after the first schema revision)
    Others,
}

impl Category {
    /// Number of categories.
    pub const COUNT: usize = 7;

    /// Every category, in persisted column order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Shirts,
        Self::Pants,
        Self::TShirts,
        Self::Sarees,
        Self::Dresses,
        Self::DryCleanShirts,
        Self::Others,
    ];

    /// Position of this category inside [`CategoryCounts`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Header of the intake count column.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Shirts => "Shirts",
            Self::Pants => "Pants",
            Self::TShirts => "T-shirts",
            Self::Sarees => "Sarees",
            Self::Dresses => "Dresses",
            Self::DryCleanShirts => "Dry_clean_shirts",
            Self::Others => "Others",
        }
    }

    /// Header of the return count column.
    #[must_use]
    pub const fn received_column(self) -> &'static str {
        match self {
            Self::Shirts => "Shirts_Received",
            Self::Pants => "Pants_Received",
            Self::TShirts => "T-shirts_Received",
            Self::Sarees => "Sarees_Received",
            Self::Dresses => "Dresses_Received",
            Self::DryCleanShirts => "Dry_clean_shirts_Received",
            Self::Others => "Others_Received",
        }
    }

    /// Human-readable label used in replies.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shirts => "Shirts",
            Self::Pants => "Pants",
            Self::TShirts => "T-shirts",
            Self::Sarees => "Sarees",
            Self::Dresses => "Dresses",
            Self::DryCleanShirts => "Dry-clean shirts/blazers",
            Self::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One non-negative count per [`Category`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CategoryCounts([u32; Category::COUNT]);

impl CategoryCounts {
    /// All counts zero.
    #[must_use]
    pub const fn new() -> Self {
        Self([0; Category::COUNT])
    }

    #[must_use]
    pub const fn get(&self, category: Category) -> u32 {
        self.0[category.index()]
    }

    pub const fn set(&mut self, category: Category, count: u32) {
        self.0[category.index()] = count;
    }

    /// Builder-style [`CategoryCounts::set`].
    #[must_use]
    pub const fn with(mut self, category: Category, count: u32) -> Self {
        self.set(category, count);
        self
    }

    /// Iterates `(category, count)` pairs in column order, zeros included.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        Category::ALL
            .into_iter()
            .map(|category| (category, self.get(category)))
    }

    /// Iterates only the categories with a non-zero count.
    pub fn non_zero(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        self.iter().filter(|(_, count)| *count > 0)
    }

    /// Whether every count is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|count| *count == 0)
    }
}

impl FromIterator<(Category, u32)> for CategoryCounts {
    fn from_iter<I: IntoIterator<Item = (Category, u32)>>(iter: I) -> Self {
        let mut counts = Self::new();
        for (category, count) in iter {
            counts.set(category, count);
        }
        counts
    }
}
