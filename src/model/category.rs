use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

/// The spending categories used throughout the ledger. Every transaction belongs to exactly one.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Income,
    Saving,
    Bills,
    Mortgage,
    Donation,
    Shopping,
    FoodAndDrink,
    Cash,
    House,
    Children,
    Transport,
    Travel,
    Misc,
    Transfers,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Category; 14] = [
        Category::Income,
        Category::Saving,
        Category::Bills,
        Category::Mortgage,
        Category::Donation,
        Category::Shopping,
        Category::FoodAndDrink,
        Category::Cash,
        Category::House,
        Category::Children,
        Category::Transport,
        Category::Travel,
        Category::Misc,
        Category::Transfers,
    ];

    /// Resolves a free-text label, as written in a worksheet, into a `Category`.
    ///
    /// The label is trimmed and lower-cased, then matched against [`LABEL_RULES`] in order. The
    /// first matching rule wins, and all exact rules come before all prefix rules.
    ///
    /// ```
    /// # use finances::model::Category;
    /// assert_eq!(Category::from_label("Saving deposit").unwrap(), Category::Saving);
    /// assert_eq!(Category::from_label("in").unwrap(), Category::Income);
    /// assert!(Category::from_label("gadgets").is_err());
    /// ```
    pub fn from_label(label: &str) -> Result<Category, UnknownCategory> {
        let normalized = label.trim().to_lowercase();
        LABEL_RULES
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.category)
            .ok_or_else(|| UnknownCategory(label.trim().to_string()))
    }
}

/// A label that is not part of the known category vocabulary.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct UnknownCategory(pub String);

impl Display for UnknownCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl StdError for UnknownCategory {}

/// How a [`LabelRule`] compares its pattern with a label.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MatchKind {
    Exact,
    Prefix,
}

/// One entry of the category vocabulary.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct LabelRule {
    pub pattern: &'static str,
    pub kind: MatchKind,
    pub category: Category,
}

impl LabelRule {
    const fn exact(pattern: &'static str, category: Category) -> Self {
        Self {
            pattern,
            kind: MatchKind::Exact,
            category,
        }
    }

    const fn prefix(pattern: &'static str, category: Category) -> Self {
        Self {
            pattern,
            kind: MatchKind::Prefix,
            category,
        }
    }

    /// `label` must already be lower-cased.
    pub fn matches(&self, label: &str) -> bool {
        match self.kind {
            MatchKind::Exact => label == self.pattern,
            MatchKind::Prefix => label.starts_with(self.pattern),
        }
    }
}

/// The category vocabulary accumulated over every revision of the ledger, in priority order.
pub const LABEL_RULES: &[LabelRule] = &[
    LabelRule::exact("income", Category::Income),
    LabelRule::exact("in", Category::Income),
    LabelRule::exact("bills", Category::Bills),
    LabelRule::exact("mortgage", Category::Mortgage),
    LabelRule::exact("donation", Category::Donation),
    LabelRule::exact("donations", Category::Donation),
    LabelRule::exact("charity", Category::Donation),
    LabelRule::exact("shopping", Category::Shopping),
    LabelRule::exact("food and drink", Category::FoodAndDrink),
    LabelRule::exact("food, cafes, pub", Category::FoodAndDrink),
    LabelRule::exact("pub", Category::FoodAndDrink),
    LabelRule::exact("eating out", Category::FoodAndDrink),
    LabelRule::exact("cash", Category::Cash),
    LabelRule::exact("house", Category::House),
    LabelRule::exact("home", Category::House),
    LabelRule::exact("children", Category::Children),
    LabelRule::exact("baby", Category::Children),
    LabelRule::exact("kids", Category::Children),
    LabelRule::exact("transport", Category::Transport),
    LabelRule::exact("travel", Category::Travel),
    LabelRule::exact("holiday", Category::Travel),
    LabelRule::exact("holidays", Category::Travel),
    LabelRule::exact("misc", Category::Misc),
    LabelRule::exact("miscellaneous", Category::Misc),
    LabelRule::exact("transfers", Category::Transfers),
    LabelRule::exact("transfer", Category::Transfers),
    LabelRule::prefix("saving", Category::Saving),
    LabelRule::prefix("monthly", Category::Bills),
    LabelRule::prefix("car", Category::Transport),
    LabelRule::prefix("mortgage", Category::Mortgage),
    LabelRule::prefix("donation", Category::Donation),
    LabelRule::prefix("food", Category::FoodAndDrink),
    LabelRule::prefix("holiday", Category::Travel),
    LabelRule::prefix("transfer", Category::Transfers),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_labels() {
        assert_eq!(Category::from_label("income").unwrap(), Category::Income);
        assert_eq!(Category::from_label("in").unwrap(), Category::Income);
        assert_eq!(Category::from_label("bills").unwrap(), Category::Bills);
        assert_eq!(Category::from_label("baby").unwrap(), Category::Children);
        assert_eq!(Category::from_label("children").unwrap(), Category::Children);
        assert_eq!(Category::from_label("holiday").unwrap(), Category::Travel);
        assert_eq!(Category::from_label("travel").unwrap(), Category::Travel);
        assert_eq!(Category::from_label("pub").unwrap(), Category::FoodAndDrink);
        assert_eq!(
            Category::from_label("food, cafes, pub").unwrap(),
            Category::FoodAndDrink
        );
    }

    #[test]
    fn test_prefix_labels() {
        assert_eq!(Category::from_label("saving deposit").unwrap(), Category::Saving);
        assert_eq!(Category::from_label("savings").unwrap(), Category::Saving);
        assert_eq!(Category::from_label("monthly bills").unwrap(), Category::Bills);
        assert_eq!(Category::from_label("car").unwrap(), Category::Transport);
        assert_eq!(Category::from_label("car insurance").unwrap(), Category::Transport);
    }

    #[test]
    fn test_case_and_whitespace_are_ignored() {
        assert_eq!(Category::from_label("  Bills ").unwrap(), Category::Bills);
        assert_eq!(Category::from_label("CASH").unwrap(), Category::Cash);
    }

    #[test]
    fn test_in_is_not_a_prefix() {
        assert!(Category::from_label("insurance").is_err());
        assert!(Category::from_label("interest").is_err());
    }

    #[test]
    fn test_unknown_label() {
        let err = Category::from_label(" Gadgets ").unwrap_err();
        assert_eq!(err, UnknownCategory(String::from("Gadgets")));
        assert_eq!(err.to_string(), "unknown category 'Gadgets'");
    }

    #[test]
    fn test_dates_and_codes_are_not_labels() {
        for text in ["05/03/2020", "DD", "POS", "ATM", "", "-45.20"] {
            assert!(Category::from_label(text).is_err(), "{text}");
        }
    }

    #[test]
    fn test_exact_rules_come_before_prefix_rules() {
        let first_prefix = LABEL_RULES
            .iter()
            .position(|r| r.kind == MatchKind::Prefix)
            .unwrap();
        assert!(LABEL_RULES[first_prefix..]
            .iter()
            .all(|r| r.kind == MatchKind::Prefix));
    }

    #[test]
    fn test_every_rule_resolves_its_own_pattern() {
        for rule in LABEL_RULES {
            assert!(rule.matches(rule.pattern));
            let resolved = Category::from_label(rule.pattern).unwrap();
            // An earlier rule may claim the pattern, but never to a different category.
            assert_eq!(resolved, rule.category, "{}", rule.pattern);
        }
    }

    #[test]
    fn test_resolution_is_repeatable() {
        for rule in LABEL_RULES {
            let a = Category::from_label(rule.pattern).unwrap();
            let b = Category::from_label(rule.pattern).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(Category::FoodAndDrink.to_string(), "food_and_drink");
        assert_eq!("food_and_drink".parse::<Category>().unwrap(), Category::FoodAndDrink);
        for category in Category::ALL {
            assert_eq!(category.to_string().parse::<Category>().unwrap(), category);
        }
    }
}
