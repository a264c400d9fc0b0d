//! Conversion between DER and fixed-length ECDSA signatures
//!
//! Tokens carry ECDSA signatures as the big-endian `r` and `s` values, each
//! left-padded to the coordinate length of the curve and concatenated. The
//! signing primitive speaks ASN.1 DER:
//!
//! ```text
//! SEQUENCE { INTEGER r, INTEGER s }
//! ```

use crate::error;

const SEQUENCE: u8 = 0x30;
const INTEGER: u8 = 0x02;
const LONG_FORM_ONE_BYTE: u8 = 0x81;

/// Converts a DER-encoded signature into its fixed-length form
///
/// # Errors
///
/// The input is not a DER sequence of two non-negative integers, or one of
/// the integers does not fit in `coordinate_len` bytes.
pub fn der_to_fixed(
    der: &[u8],
    coordinate_len: usize,
) -> Result<Vec<u8>, error::MalformedEcdsaSignature> {
    let (tag, rest) = der
        .split_first()
        .ok_or(error::malformed_ecdsa_signature("empty input"))?;
    if *tag != SEQUENCE {
        return Err(error::malformed_ecdsa_signature("expected a sequence"));
    }

    let (len, body) = read_length(rest)?;
    if body.len() != len {
        return Err(error::malformed_ecdsa_signature(
            "sequence length does not match input",
        ));
    }

    let (r, body) = read_integer(body)?;
    let (s, body) = read_integer(body)?;
    if !body.is_empty() {
        return Err(error::malformed_ecdsa_signature(
            "unexpected data after signature values",
        ));
    }

    let mut fixed = vec![0; coordinate_len * 2];
    write_padded(r, &mut fixed[..coordinate_len])?;
    write_padded(s, &mut fixed[coordinate_len..])?;
    Ok(fixed)
}

/// Converts a fixed-length signature into DER
///
/// # Errors
///
/// The input is not exactly twice `coordinate_len` bytes long, or the
/// encoded values would need more than a single length byte.
pub fn fixed_to_der(
    fixed: &[u8],
    coordinate_len: usize,
) -> Result<Vec<u8>, error::MalformedEcdsaSignature> {
    if coordinate_len == 0 || fixed.len() != coordinate_len * 2 {
        return Err(error::malformed_ecdsa_signature(
            "signature does not match the coordinate length",
        ));
    }

    let (r, s) = fixed.split_at(coordinate_len);

    let mut body = Vec::with_capacity(fixed.len() + 6);
    write_integer(r, &mut body)?;
    write_integer(s, &mut body)?;

    let mut der = Vec::with_capacity(body.len() + 3);
    der.push(SEQUENCE);
    write_length(body.len(), &mut der)?;
    der.extend_from_slice(&body);
    Ok(der)
}

fn read_length(input: &[u8]) -> Result<(usize, &[u8]), error::MalformedEcdsaSignature> {
    match input {
        [len, rest @ ..] if *len < 0x80 => Ok((usize::from(*len), rest)),
        [LONG_FORM_ONE_BYTE, len, rest @ ..] if *len >= 0x80 => Ok((usize::from(*len), rest)),
        [LONG_FORM_ONE_BYTE, ..] => Err(error::malformed_ecdsa_signature(
            "length is not minimally encoded",
        )),
        [] => Err(error::malformed_ecdsa_signature("missing length")),
        _ => Err(error::malformed_ecdsa_signature("unsupported length encoding")),
    }
}

fn write_length(len: usize, out: &mut Vec<u8>) -> Result<(), error::MalformedEcdsaSignature> {
    if len < 0x80 {
        out.push(len as u8);
    } else if len <= 0xff {
        out.push(LONG_FORM_ONE_BYTE);
        out.push(len as u8);
    } else {
        return Err(error::malformed_ecdsa_signature("signature is too long"));
    }

    Ok(())
}

fn read_integer(input: &[u8]) -> Result<(&[u8], &[u8]), error::MalformedEcdsaSignature> {
    let (tag, rest) = input
        .split_first()
        .ok_or(error::malformed_ecdsa_signature("missing integer"))?;
    if *tag != INTEGER {
        return Err(error::malformed_ecdsa_signature("expected an integer"));
    }

    let (len, rest) = read_length(rest)?;
    if len == 0 {
        return Err(error::malformed_ecdsa_signature("empty integer"));
    }
    if rest.len() < len {
        return Err(error::malformed_ecdsa_signature("integer is truncated"));
    }

    let (value, rest) = rest.split_at(len);
    if value[0] & 0x80 != 0 {
        return Err(error::malformed_ecdsa_signature("negative integer"));
    }

    Ok((value, rest))
}

fn write_integer(value: &[u8], out: &mut Vec<u8>) -> Result<(), error::MalformedEcdsaSignature> {
    let first_significant = value.iter().position(|&b| b != 0);
    let value = match first_significant {
        Some(idx) => &value[idx..],
        None => &[0][..],
    };

    let needs_sign_byte = value[0] & 0x80 != 0;
    let len = value.len() + usize::from(needs_sign_byte);

    out.push(INTEGER);
    write_length(len, out)?;
    if needs_sign_byte {
        out.push(0);
    }
    out.extend_from_slice(value);
    Ok(())
}

fn write_padded(value: &[u8], out: &mut [u8]) -> Result<(), error::MalformedEcdsaSignature> {
    let first_significant = value.iter().position(|&b| b != 0).unwrap_or(value.len());
    let value = &value[first_significant..];
    if value.len() > out.len() {
        return Err(error::malformed_ecdsa_signature(
            "integer does not fit the coordinate length",
        ));
    }

    let offset = out.len() - value.len();
    out[offset..].copy_from_slice(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;

    #[test]
    fn small_values_are_left_padded() -> Result<()> {
        let der = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
        let fixed = der_to_fixed(&der, 4)?;
        assert_eq!(fixed, [0, 0, 0, 1, 0, 0, 0, 2]);
        assert_eq!(fixed_to_der(&fixed, 4)?, der);
        Ok(())
    }

    #[test]
    fn zero_is_encoded_as_a_single_byte() -> Result<()> {
        let fixed = [0u8; 8];
        let der = fixed_to_der(&fixed, 4)?;
        assert_eq!(der, [0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00]);
        assert_eq!(der_to_fixed(&der, 4)?, fixed);
        Ok(())
    }

    #[test]
    fn high_bit_gets_a_sign_byte() -> Result<()> {
        let fixed = [0x80, 0, 0, 0, 0xff, 0xff, 0xff, 0xff];
        let der = fixed_to_der(&fixed, 4)?;
        assert_eq!(
            der,
            [
                0x30, 0x0e, 0x02, 0x05, 0x00, 0x80, 0x00, 0x00, 0x00, 0x02, 0x05, 0x00, 0xff, 0xff,
                0xff, 0xff,
            ]
        );
        assert_eq!(der_to_fixed(&der, 4)?, fixed);
        Ok(())
    }

    #[test]
    fn leading_zeros_are_stripped() -> Result<()> {
        let fixed = [0x00, 0x00, 0x12, 0x34, 0x00, 0x7f, 0xff, 0xff];
        let der = fixed_to_der(&fixed, 4)?;
        assert_eq!(
            der,
            [0x30, 0x09, 0x02, 0x02, 0x12, 0x34, 0x02, 0x03, 0x7f, 0xff, 0xff]
        );
        assert_eq!(der_to_fixed(&der, 4)?, fixed);
        Ok(())
    }

    #[test]
    fn redundant_leading_zeros_are_tolerated_on_input() -> Result<()> {
        let der = [0x30, 0x08, 0x02, 0x02, 0x00, 0x01, 0x02, 0x02, 0x00, 0x02];
        assert_eq!(der_to_fixed(&der, 2)?, [0, 1, 0, 2]);
        Ok(())
    }

    #[test]
    fn p521_maximum_values_use_long_form_length() -> Result<()> {
        let mut fixed = vec![0xff; 132];
        fixed[0] = 0x01;
        fixed[66] = 0x01;

        let der = fixed_to_der(&fixed, 66)?;
        assert_eq!(&der[..3], &[0x30, 0x81, 0x88]);
        assert_eq!(der.len(), 3 + 0x88);
        assert_eq!(&der[3..5], &[0x02, 0x42]);
        assert_eq!(der_to_fixed(&der, 66)?, fixed);
        Ok(())
    }

    #[test]
    fn full_width_high_bit_for_p256() -> Result<()> {
        let fixed = vec![0xff; 64];
        let der = fixed_to_der(&fixed, 32)?;
        assert_eq!(&der[..2], &[0x30, 0x46]);
        assert_eq!(&der[2..5], &[0x02, 0x21, 0x00]);
        assert_eq!(der_to_fixed(&der, 32)?, fixed);
        Ok(())
    }

    #[test]
    fn wide_integers_use_long_form_length() -> Result<()> {
        let mut fixed = vec![0x80; 127];
        fixed.extend_from_slice(&[0; 126]);
        fixed.push(0x01);

        let der = fixed_to_der(&fixed, 127)?;
        assert_eq!(&der[..3], &[0x30, 0x81, 0x86]);
        assert_eq!(&der[3..7], &[0x02, 0x81, 0x80, 0x00]);
        assert_eq!(&der[der.len() - 3..], &[0x02, 0x01, 0x01]);
        assert_eq!(der.len(), 3 + 0x86);
        assert_eq!(der_to_fixed(&der, 127)?, fixed);
        Ok(())
    }

    #[test]
    fn values_past_one_length_byte_are_rejected() {
        let err = fixed_to_der(&[0xff; 400], 200).unwrap_err();
        assert_eq!(err.to_string(), "malformed ECDSA signature: signature is too long");
    }

    #[test]
    fn wrong_fixed_length_is_rejected() {
        assert!(fixed_to_der(&[0; 63], 32).is_err());
        assert!(fixed_to_der(&[0; 65], 32).is_err());
        assert!(fixed_to_der(&[], 0).is_err());
    }

    #[test]
    fn malformed_der_is_rejected() {
        let cases: &[&[u8]] = &[
            &[],
            &[0x31, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02],
            &[0x30, 0x07, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02],
            &[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01],
            &[0x30, 0x06, 0x02, 0x01, 0x01, 0x04, 0x01, 0x02],
            &[0x30, 0x06, 0x02, 0x01, 0x81, 0x02, 0x01, 0x02],
            &[0x30, 0x06, 0x02, 0x00, 0x02, 0x02, 0x01, 0x02],
            &[0x30, 0x03, 0x02, 0x01, 0x01],
            &[0x30, 0x81, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02],
        ];

        for der in cases {
            assert!(der_to_fixed(der, 4).is_err(), "{:02x?} should be rejected", der);
        }
    }

    #[test]
    fn trailing_data_is_rejected() {
        let der = [0x30, 0x09, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02, 0x02, 0x01, 0x03];
        let err = der_to_fixed(&der, 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed ECDSA signature: unexpected data after signature values"
        );
    }

    #[test]
    fn oversized_integer_is_rejected() {
        let der = [0x30, 0x08, 0x02, 0x03, 0x01, 0x00, 0x00, 0x02, 0x01, 0x01];
        let err = der_to_fixed(&der, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed ECDSA signature: integer does not fit the coordinate length"
        );
    }
}
