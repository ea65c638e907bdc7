pub(crate) mod asn1;
pub(crate) mod der;
