use crate::{context::EvalContext, serutil::StringLikeStrList};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NumericCmp {
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
}

impl NumericCmp {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Equals => "NumericEquals",
            Self::NotEquals => "NumericNotEquals",
            Self::LessThan => "NumericLessThan",
            Self::GreaterThan => "NumericGreaterThan",
        }
    }
}

pub(crate) fn numeric_match(ctx: &EvalContext, key: &str, allowed: &StringLikeStrList, cmp: NumericCmp) -> bool {
    let value: f64 = match ctx.get(key).and_then(|v| v.parse().ok()) {
        Some(v) => v,
        None => return false,
    };

    allowed.iter().any(|raw| match raw.parse::<f64>() {
        Ok(expected) => match cmp {
            NumericCmp::Equals => value == expected,
            NumericCmp::NotEquals => value != expected,
            NumericCmp::LessThan => value < expected,
            NumericCmp::GreaterThan => value > expected,
        },
        Err(_) => false,
    })
}
