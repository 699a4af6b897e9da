use authenticator_jws::{base64url_decode, Crypt, FlowType, JwsComposer, SignedAssertion};

#[test]
fn compact_segments_decode_to_original_parts() -> anyhow::Result<()> {
    let header = br#"{"alg":"PS256","typ":"JWT"}"#.to_vec();
    let payload = br#"{"njwt":"eyJhbGciOiJub25lIn0.e30."}"#.to_vec();
    let signature = vec![0u8, 1, 2, 250, 251, 252, 253, 254, 255];

    let assertion = SignedAssertion::compose(header.clone(), payload.clone(), signature.clone())?;
    let compact = assertion.to_compact();
    assert_eq!(compact, assertion.to_compact());
    assert!(!compact.contains('='));

    let segments: Vec<&str> = compact.split('.').collect();
    assert_eq!(segments.len(), 3);
    assert_eq!(base64url_decode(segments[0])?, header);
    assert_eq!(base64url_decode(segments[1])?, payload);
    assert_eq!(base64url_decode(segments[2])?, signature);

    assert_eq!(SignedAssertion::parse(&compact)?, assertion);
    Ok(())
}

#[test]
fn composed_assertion_carries_certificate_and_challenge() -> anyhow::Result<()> {
    let composer = FlowType::Cidp.composer("MIIDcert", "idp-challenge", Crypt::Ecc);
    let assertion = composer.compose(vec![7; 64])?;

    let header = assertion.header_json()?;
    assert_eq!(header["alg"], "BP256R1");
    assert_eq!(header["cty"], "NJWT");
    assert_eq!(header["x5c"][0], "MIIDcert");
    assert_eq!(assertion.payload_json()?["njwt"], "idp-challenge");
    assert_eq!(assertion.signing_input(), composer.create_signing_input()?);
    Ok(())
}

#[test]
fn ogr_and_cidp_differ_for_same_input() -> anyhow::Result<()> {
    let ogr = FlowType::Ogr.composer("cert", "challenge", Crypt::Rsa);
    let cidp = FlowType::Cidp.composer("cert", "challenge", Crypt::Rsa);

    assert_ne!(ogr.digest()?, cidp.digest()?);
    assert_eq!(ogr.flow(), FlowType::Ogr);
    assert_eq!(ogr.algorithm().alg, "RS256");
    assert_eq!(cidp.algorithm().alg, "PS256");
    Ok(())
}
