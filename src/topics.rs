//! Topic normalization for the browser.
//!
//! Raw topics arrive from the store in whatever spelling the author typed
//! ("Diwali", "diwali ", " DIWALI"). Everything downstream works with the
//! normalized value as the identity key and shows a title-cased label.
//!
//! # Examples
//!
//! ```
//! use prasang::topics::TopicNormalizer;
//!
//! let chips = TopicNormalizer::build_chips(["Guru-purnima", "diwali", " DIWALI"]);
//!
//! assert_eq!(chips.len(), 2);
//! assert_eq!(chips[0].label, "Diwali");
//! assert_eq!(chips[1].label, "Guru-Purnima");
//! ```

mod normalizer;

pub use normalizer::{TopicNormalizer, compare_labels};
