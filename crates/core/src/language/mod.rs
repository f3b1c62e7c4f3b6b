pub mod homograph;
pub mod ipa;
pub mod mapping;
pub mod rules;
pub mod similarity;
pub mod validate;

pub use homograph::{HomographEntry, HomographResolver, HomographTable};
pub use ipa::{MapperOptions, PhoneticMapper};
pub use mapping::{GraphemeOverride, MappingTable, PhoneticMapping};
pub use rules::{PhoneticRule, PhoneticRuleSet, PhoneticRuleSpec, RuleCondition};
pub use similarity::PhonemeSimilarityGraph;
pub use validate::validate;
