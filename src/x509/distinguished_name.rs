//! Distinguished names carried from parsed requests into issued certificates

use rcgen::string::{Ia5String, PrintableString};
use rcgen::{DistinguishedName, DnType, DnValue};
use x509_parser::der_parser::asn1_rs::Tag;
use x509_parser::x509::{AttributeTypeAndValue, X509Name};

use super::oid_components;
use crate::error::{CaError, Result};

const COMMON_NAME: &[u64] = &[2, 5, 4, 3];
const COUNTRY: &[u64] = &[2, 5, 4, 6];
const LOCALITY: &[u64] = &[2, 5, 4, 7];
const STATE: &[u64] = &[2, 5, 4, 8];
const ORGANIZATION: &[u64] = &[2, 5, 4, 10];
const ORGANIZATIONAL_UNIT: &[u64] = &[2, 5, 4, 11];

/// Subject with only an organization attribute.
pub fn organization_only(organization: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::OrganizationName, organization);
    dn
}

/// Subject with only a common name attribute.
pub fn common_name_only(common_name: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    dn
}

/// Rebuild a parsed name attribute by attribute, keeping order and string types.
///
/// A [`DistinguishedName`] holds one single-valued RDN per attribute type, so
/// names with repeated types (`DC=com, DC=example`) or multi-valued RDNs are
/// rejected rather than rewritten.
pub fn from_x509_name(name: &X509Name<'_>) -> Result<DistinguishedName> {
    let mut dn = DistinguishedName::new();
    for rdn in name.iter() {
        let mut attrs = rdn.iter();
        let (Some(attr), None) = (attrs.next(), attrs.next()) else {
            return Err(CaError::MalformedRequest(
                "multi-valued relative distinguished names are not supported".to_string(),
            ));
        };
        let dn_type = dn_type(attr);
        if dn.get(&dn_type).is_some() {
            return Err(CaError::MalformedRequest(format!(
                "repeated subject attribute {}",
                attr.attr_type().to_id_string()
            )));
        }
        dn.push(dn_type, dn_value(attr)?);
    }
    Ok(dn)
}

/// First common name of a parsed name, if it is a readable string.
pub fn common_name(name: &X509Name<'_>) -> Option<String> {
    name.iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::to_string)
}

fn dn_type(attr: &AttributeTypeAndValue<'_>) -> DnType {
    let oid = oid_components(attr.attr_type());
    match oid.as_slice() {
        COMMON_NAME => DnType::CommonName,
        COUNTRY => DnType::CountryName,
        LOCALITY => DnType::LocalityName,
        STATE => DnType::StateOrProvinceName,
        ORGANIZATION => DnType::OrganizationName,
        ORGANIZATIONAL_UNIT => DnType::OrganizationalUnitName,
        _ => DnType::CustomDnType(oid),
    }
}

fn dn_value(attr: &AttributeTypeAndValue<'_>) -> Result<DnValue> {
    let text = attr.as_str().map_err(|e| {
        CaError::MalformedRequest(format!("unreadable subject attribute: {e}"))
    })?;
    let value = match attr.attr_value().tag() {
        Tag::PrintableString => PrintableString::try_from(text.to_string())
            .map(DnValue::PrintableString)
            .map_err(|e| CaError::MalformedRequest(format!("subject attribute: {e}")))?,
        Tag::Ia5String => Ia5String::try_from(text.to_string())
            .map(DnValue::Ia5String)
            .map_err(|e| CaError::MalformedRequest(format!("subject attribute: {e}")))?,
        _ => DnValue::Utf8String(text.to_string()),
    };
    Ok(value)
}
