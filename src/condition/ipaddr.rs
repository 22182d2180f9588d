use {
    crate::{context::EvalContext, serutil::StringLikeStrList},
    ipnet::IpNet,
    std::net::IpAddr,
};

pub(crate) fn ip_address_match(ctx: &EvalContext, key: &str, allowed: &StringLikeStrList) -> bool {
    let value: IpAddr = match ctx.get(key).and_then(|v| v.parse().ok()) {
        Some(v) => v,
        None => return false,
    };

    allowed.iter().any(|raw| {
        if let Ok(net) = raw.parse::<IpNet>() {
            net.contains(&value)
        } else if let Ok(ip) = raw.parse::<IpAddr>() {
            ip == value
        } else {
            false
        }
    })
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    fn ctx(ip: &str) -> EvalContext {
        EvalContext::builder().action("a").service("s").build().unwrap().with_value("aws:SourceIp", ip)
    }

    #[test_log::test]
    fn test_cidr_match() {
        let allowed = StringLikeStrList::Single("192.168.1.0/24".to_string());
        assert!(ip_address_match(&ctx("192.168.1.5"), "aws:SourceIp", &allowed));
        assert!(!ip_address_match(&ctx("10.0.0.1"), "aws:SourceIp", &allowed));
    }

    #[test_log::test]
    fn test_literal_match() {
        let allowed = StringLikeStrList::Single("192.168.1.5".to_string());
        assert!(ip_address_match(&ctx("192.168.1.5"), "aws:SourceIp", &allowed));
    }

    #[test_log::test]
    fn test_non_ip_context_fails() {
        let allowed = StringLikeStrList::Single("192.168.1.0/24".to_string());
        assert!(!ip_address_match(&ctx("not-an-ip"), "aws:SourceIp", &allowed));
    }
}
