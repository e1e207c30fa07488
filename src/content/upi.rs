use regex::Regex;
use std::sync::OnceLock;

/// URI scheme prefix of UPI payment links
pub const UPI_PREFIX: &str = "upi://";

/// Link prefix of a UPI payment request
const PAY_PREFIX: &str = "upi://pay?";

static UPI_PARAM_PATTERN: OnceLock<Regex> = OnceLock::new();

fn upi_param_pattern() -> &'static Regex {
    UPI_PARAM_PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|&)(pa|pn)=([^&]*)").expect("static UPI pattern")
    })
}

/// Payee fields of a well-formed UPI payment link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpiPayment<'a> {
    /// `pa`: payee virtual payment address
    pub payee: &'a str,
    /// `pn`: payee display name
    pub name: &'a str,
}

/// Parse a `upi://pay?` link whose query carries non-empty `pa` and `pn`.
///
/// Parameters may appear in any order among others; the first occurrence of
/// each key wins. `None` means the link cannot be paid as-is and is treated
/// as malformed.
pub fn parse_payment(payload: &str) -> Option<UpiPayment<'_>> {
    let query = payload.strip_prefix(PAY_PREFIX)?;
    let mut payee = None;
    let mut name = None;
    for caps in upi_param_pattern().captures_iter(query) {
        let slot = match &caps[1] {
            "pa" => &mut payee,
            _ => &mut name,
        };
        if slot.is_none() {
            *slot = caps.get(2).map(|m| m.as_str());
        }
    }
    match (payee?, name?) {
        (payee, name) if !payee.is_empty() && !name.is_empty() => {
            Some(UpiPayment { payee, name })
        }
        _ => None,
    }
}

/// True for payment links that carry both payee and name
pub fn is_valid(payload: &str) -> bool {
    parse_payment(payload).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_payment() {
        let p = parse_payment("upi://pay?pa=merchant@bank&pn=MerchantName").unwrap();
        assert_eq!(p.payee, "merchant@bank");
        assert_eq!(p.name, "MerchantName");
    }

    #[test]
    fn test_extra_params_allowed() {
        assert!(is_valid("upi://pay?pa=shop@upi&pn=Shop&am=100.00&cu=INR"));
    }

    #[test]
    fn test_params_between_payee_and_name() {
        let p = parse_payment("upi://pay?pa=merchant@bank&am=10.00&pn=MerchantName").unwrap();
        assert_eq!(p.payee, "merchant@bank");
        assert_eq!(p.name, "MerchantName");
    }

    #[test]
    fn test_name_before_payee() {
        let p = parse_payment("upi://pay?am=5&pn=Shop&cu=INR&pa=shop@upi").unwrap();
        assert_eq!(p.payee, "shop@upi");
        assert_eq!(p.name, "Shop");
    }

    #[test]
    fn test_key_must_match_whole_param() {
        // `xpa` is not `pa`
        assert!(!is_valid("upi://pay?xpa=merchant@bank&pn=MerchantName"));
        let p = parse_payment("upi://pay?pa=first@bank&pn=A&pa=second@bank").unwrap();
        assert_eq!(p.payee, "first@bank");
    }

    #[test]
    fn test_missing_payee() {
        assert!(!is_valid("upi://pay?pn=MerchantName"));
    }

    #[test]
    fn test_empty_values() {
        assert!(!is_valid("upi://pay?pa=&pn=MerchantName"));
        assert!(!is_valid("upi://pay?pa=merchant@bank&pn="));
        assert!(!is_valid("upi://pay?pa=&am=1&pn=MerchantName"));
    }

    #[test]
    fn test_wrong_action() {
        assert!(!is_valid("upi://mandate?pa=merchant@bank&pn=X"));
        assert!(!is_valid("upi://"));
    }
}
