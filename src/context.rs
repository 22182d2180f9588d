//! The request context the Policy Evaluator (C3), Condition Evaluator (C2),
//! and Trust Evaluator (C6) all consult: the action being performed, the
//! resource(s) it targets, and a flat map of context keys (`aws:SourceIp`,
//! `sts:ExternalId`, caller-supplied `x-context-*` keys, ...) used by
//! condition operators. A plain string-keyed map; this crate's condition
//! operators do not need `${var}` substitution.

use {crate::resource::Arn, derive_builder::Builder, std::collections::BTreeMap};

#[derive(Builder, Clone, Debug, Default, Eq, PartialEq)]
#[builder(default)]
pub struct EvalContext {
    #[builder(setter(into))]
    pub action: String,

    #[builder(setter(into))]
    pub service: String,

    pub resources: Vec<Arn>,

    pub values: BTreeMap<String, String>,
}

impl EvalContext {
    pub fn builder() -> EvalContextBuilder {
        EvalContextBuilder::default()
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn with_value<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test_log::test]
    fn test_builder_defaults() {
        let ctx = EvalContext::builder().action("s3:GetObject").service("s3").build().unwrap();
        assert_eq!(ctx.action, "s3:GetObject");
        assert!(ctx.values.is_empty());
    }

    #[test_log::test]
    fn test_with_value() {
        let ctx = EvalContext::builder()
            .action("s3:GetObject")
            .service("s3")
            .build()
            .unwrap()
            .with_value("aws:SourceIp", "192.168.1.5");
        assert_eq!(ctx.get("aws:SourceIp"), Some("192.168.1.5"));
        assert_eq!(ctx.get("missing"), None);
    }
}
