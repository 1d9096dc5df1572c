use snmp2::{Oid, Value};

use snmpr_common::error::{SnmpError, SnmpResult};

/// Parses a dotted OID such as `1.3.6.1.2.1.1.1.0`. A leading dot is allowed.
pub fn parse_oid(s: &str) -> SnmpResult<Oid<'static>> {
    let invalid = || SnmpError::InvalidOid(s.to_string());
    let trimmed = s.trim().trim_start_matches('.');

    if trimmed.is_empty() {
        return Err(invalid());
    }

    let arcs: Vec<u64> = trimmed
        .split('.')
        .map(str::parse::<u64>)
        .collect::<Result<_, _>>()
        .map_err(|_| invalid())?;

    // X.690: at least two arcs, the first one 0, 1 or 2
    if arcs.len() < 2 || arcs[0] > 2 {
        return Err(invalid());
    }

    Oid::from(&arcs).map_err(|_| invalid())
}

/// Textual form of a decoded value, as stored in host records.
///
/// Printable octet strings are kept as text, anything else is rendered as
/// `0x`-prefixed hex (MAC addresses, binary blobs).
pub fn render_value(value: &Value<'_>) -> String {
    match value {
        Value::OctetString(bytes) => render_octets(bytes),
        Value::Opaque(bytes) => hex(bytes),
        Value::Integer(n) => n.to_string(),
        Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => n.to_string(),
        Value::Counter64(n) => n.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::IpAddress([a, b, c, d]) => format!("{a}.{b}.{c}.{d}"),
        Value::ObjectIdentifier(oid) => oid.to_string(),
        Value::Null => String::new(),
        Value::NoSuchObject => "noSuchObject".to_string(),
        Value::NoSuchInstance => "noSuchInstance".to_string(),
        Value::EndOfMibView => "endOfMibView".to_string(),
        other => format!("{other:?}"),
    }
}

/// Exception values carry no data; a GET answering with one has no value.
pub fn exception_reason(value: &Value<'_>) -> Option<&'static str> {
    match value {
        Value::NoSuchObject => Some("noSuchObject"),
        Value::NoSuchInstance => Some("noSuchInstance"),
        Value::EndOfMibView => Some("endOfMibView"),
        _ => None,
    }
}

/// RFC 3416 error-status names.
pub fn error_status_name(status: u32) -> &'static str {
    match status {
        0 => "noError",
        1 => "tooBig",
        2 => "noSuchName",
        3 => "badValue",
        4 => "readOnly",
        5 => "genErr",
        6 => "noAccess",
        7 => "wrongType",
        8 => "wrongLength",
        9 => "wrongEncoding",
        10 => "wrongValue",
        11 => "noCreation",
        12 => "inconsistentValue",
        13 => "resourceUnavailable",
        14 => "commitFailed",
        15 => "undoFailed",
        16 => "authorizationError",
        17 => "notWritable",
        18 => "inconsistentName",
        _ => "unknownError",
    }
}

/// Turns a non-zero error-status into an error naming the offending OID.
///
/// `error_index` is 1-based into the request varbinds; `0` means the agent
/// did not point at one, reported as `?`.
pub fn check_error_status(status: u32, error_index: u32, requested: &[&str]) -> SnmpResult<()> {
    if status == 0 {
        return Ok(());
    }

    let oid = (error_index as usize)
        .checked_sub(1)
        .and_then(|idx| requested.get(idx))
        .map_or_else(|| "?".to_string(), |oid| oid.to_string());

    Err(SnmpError::Agent {
        status: error_status_name(status).to_string(),
        oid,
    })
}

fn render_octets(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) if is_printable(text) => text.trim_end_matches('\0').to_string(),
        _ => hex(bytes),
    }
}

fn is_printable(text: &str) -> bool {
    text.trim_end_matches('\0')
        .chars()
        .all(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
}

fn hex(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    let digits: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("0x{digits}")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_oid_accepts_dotted_numbers() {
        let oid = parse_oid("1.3.6.1.2.1.1.1.0").unwrap();
        assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.1.0");
        assert_eq!(parse_oid(" .1.3.6.1 ").unwrap().to_string(), "1.3.6.1");
    }

    #[test]
    fn parse_oid_rejects_malformed_input() {
        for bad in ["", ".", "1", "1..3", "1.3.x", "7.1.2", "1.3.6.-1", "sysDescr"] {
            assert!(
                matches!(parse_oid(bad), Err(SnmpError::InvalidOid(_))),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn render_keeps_printable_text_and_hexes_binary() {
        assert_eq!(render_value(&Value::OctetString(b"Linux gw 6.1.0")), "Linux gw 6.1.0");
        assert_eq!(render_value(&Value::OctetString(b"eth0\0")), "eth0");
        assert_eq!(
            render_value(&Value::OctetString(&[0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e])),
            "0x001a2b3c4d5e"
        );
        assert_eq!(render_value(&Value::OctetString(b"")), "");
    }

    #[test]
    fn render_numbers_addresses_and_oids() {
        assert_eq!(render_value(&Value::Integer(-3)), "-3");
        assert_eq!(render_value(&Value::Timeticks(123456)), "123456");
        assert_eq!(render_value(&Value::Counter32(42)), "42");
        assert_eq!(render_value(&Value::Counter64(u64::MAX)), u64::MAX.to_string());
        assert_eq!(render_value(&Value::IpAddress([10, 0, 0, 1])), "10.0.0.1");

        let oid = parse_oid("1.3.6.1.4.1.8072.3.2.10").unwrap();
        assert_eq!(render_value(&Value::ObjectIdentifier(oid)), "1.3.6.1.4.1.8072.3.2.10");
    }

    #[test]
    fn exceptions_have_reasons() {
        assert_eq!(exception_reason(&Value::NoSuchObject), Some("noSuchObject"));
        assert_eq!(exception_reason(&Value::EndOfMibView), Some("endOfMibView"));
        assert_eq!(exception_reason(&Value::Integer(0)), None);
    }

    #[test]
    fn error_status_points_at_requested_oid() {
        assert!(check_error_status(0, 0, &["1.3.6.1.2.1.1.1.0"]).is_ok());

        let err = check_error_status(2, 1, &["1.3.6.1.2.1.1.9.0"]).unwrap_err();
        assert_eq!(err.to_string(), "noSuchName at 1.3.6.1.2.1.1.9.0");

        let err = check_error_status(5, 0, &["1.3.6.1.2.1.1.9.0"]).unwrap_err();
        assert_eq!(err.to_string(), "genErr at ?");

        let err = check_error_status(99, 4, &["1.3"]).unwrap_err();
        assert_eq!(err.to_string(), "unknownError at ?");
    }
}
