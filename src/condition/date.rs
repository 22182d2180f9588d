use {
    crate::{context::EvalContext, serutil::StringLikeStrList},
    chrono::{DateTime, Utc},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DateCmp {
    GreaterThan,
    LessThan,
}

impl DateCmp {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GreaterThan => "DateGreaterThan",
            Self::LessThan => "DateLessThan",
        }
    }
}

fn parse(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn date_match(ctx: &EvalContext, key: &str, allowed: &StringLikeStrList, cmp: DateCmp) -> bool {
    let value = match ctx.get(key).and_then(parse) {
        Some(v) => v,
        None => return false,
    };

    allowed.iter().any(|raw| match parse(raw) {
        Some(expected) => match cmp {
            DateCmp::GreaterThan => value > expected,
            DateCmp::LessThan => value < expected,
        },
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    fn ctx(value: &str) -> EvalContext {
        EvalContext::builder().action("a").service("s").build().unwrap().with_value("aws:CurrentTime", value)
    }

    #[test_log::test]
    fn test_greater_than() {
        let allowed = StringLikeStrList::Single("2020-01-01T00:00:00Z".to_string());
        assert!(date_match(&ctx("2021-01-01T00:00:00Z"), "aws:CurrentTime", &allowed, DateCmp::GreaterThan));
        assert!(!date_match(&ctx("2019-01-01T00:00:00Z"), "aws:CurrentTime", &allowed, DateCmp::GreaterThan));
    }

    #[test_log::test]
    fn test_less_than() {
        let allowed = StringLikeStrList::Single("2020-01-01T00:00:00Z".to_string());
        assert!(date_match(&ctx("2019-01-01T00:00:00Z"), "aws:CurrentTime", &allowed, DateCmp::LessThan));
    }

    #[test_log::test]
    fn test_bad_date_fails() {
        let allowed = StringLikeStrList::Single("2020-01-01T00:00:00Z".to_string());
        assert!(!date_match(&ctx("not-a-date"), "aws:CurrentTime", &allowed, DateCmp::GreaterThan));
    }
}
