use crate::{context::EvalContext, serutil::StringLikeStrList};

pub(crate) fn bool_match(ctx: &EvalContext, key: &str, allowed: &StringLikeStrList) -> bool {
    let value: bool = match ctx.get(key).and_then(|v| v.parse().ok()) {
        Some(v) => v,
        None => return false,
    };

    allowed.iter().any(|raw| raw.parse::<bool>().map(|expected| expected == value).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    fn ctx(value: &str) -> EvalContext {
        EvalContext::builder().action("a").service("s").build().unwrap().with_value("aws:MultiFactorAuthPresent", value)
    }

    #[test_log::test]
    fn test_true_match() {
        let allowed = StringLikeStrList::Single("true".to_string());
        assert!(bool_match(&ctx("true"), "aws:MultiFactorAuthPresent", &allowed));
        assert!(!bool_match(&ctx("false"), "aws:MultiFactorAuthPresent", &allowed));
    }

    #[test_log::test]
    fn test_missing_key_fails() {
        let allowed = StringLikeStrList::Single("true".to_string());
        assert!(!bool_match(&ctx("not-a-bool"), "aws:MultiFactorAuthPresent", &allowed));
    }
}
