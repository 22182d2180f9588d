use crate::{context::EvalContext, matcher::matches as glob_matches, serutil::StringLikeStrList};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StringCmp {
    Equals,
    Like,
}

impl StringCmp {
    pub fn display_name(&self, negated: bool) -> &'static str {
        match (self, negated) {
            (Self::Equals, false) => "StringEquals",
            (Self::Equals, true) => "StringNotEquals",
            (Self::Like, false) => "StringLike",
            (Self::Like, true) => "StringNotLike",
        }
    }
}

pub(crate) fn string_match(ctx: &EvalContext, key: &str, allowed: &StringLikeStrList, cmp: StringCmp, negated: bool) -> bool {
    let value = match ctx.get(key) {
        Some(v) => v,
        None => return false,
    };

    let any_match = allowed.iter().any(|pattern| match cmp {
        StringCmp::Equals => pattern == value,
        StringCmp::Like => glob_matches(pattern, value),
    });

    any_match != negated
}

#[cfg(test)]
mod tests {
    use {super::*, crate::context::EvalContext, pretty_assertions::assert_eq};

    fn ctx() -> EvalContext {
        EvalContext::builder().action("a").service("s").build().unwrap().with_value("ec2:Region", "us-west-2")
    }

    #[test_log::test]
    fn test_equals() {
        let allowed = StringLikeStrList::Single("us-west-2".to_string());
        assert!(string_match(&ctx(), "ec2:Region", &allowed, StringCmp::Equals, false));
        assert!(!string_match(&ctx(), "ec2:Region", &allowed, StringCmp::Equals, true));
    }

    #[test_log::test]
    fn test_like() {
        let allowed = StringLikeStrList::Single("us-*".to_string());
        assert!(string_match(&ctx(), "ec2:Region", &allowed, StringCmp::Like, false));
    }

    #[test_log::test]
    fn test_missing_key_fails() {
        let allowed = StringLikeStrList::Single("us-west-2".to_string());
        assert!(!string_match(&ctx(), "missing", &allowed, StringCmp::Equals, false));
    }

    #[test_log::test]
    fn test_multi_value_or() {
        let allowed =
            StringLikeStrList::List(vec!["us-east-1".to_string(), "us-west-2".to_string()]);
        assert!(string_match(&ctx(), "ec2:Region", &allowed, StringCmp::Equals, false));
    }
}
