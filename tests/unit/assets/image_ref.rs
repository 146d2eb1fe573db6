use super::*;

#[test]
fn parse_classifies_references() {
    assert_eq!(
        ImageRef::parse("https://cdn.example.com/a.png").unwrap(),
        ImageRef::Url("https://cdn.example.com/a.png".to_string())
    );
    assert_eq!(
        ImageRef::parse("file:///tmp/a.png").unwrap(),
        ImageRef::Path(PathBuf::from("/tmp/a.png"))
    );
    assert_eq!(
        ImageRef::parse("out/a.png").unwrap(),
        ImageRef::Path(PathBuf::from("out/a.png"))
    );
    assert!(ImageRef::parse("  ").is_err());
}

#[test]
fn data_url_decodes_payload() {
    let r = ImageRef::parse("data:image/png;base64,AQID").unwrap();
    let ImageRef::Data { mime, bytes } = &r else {
        panic!("expected embedded image");
    };
    assert_eq!(mime, "image/png");
    assert_eq!(&bytes[..], &[1, 2, 3]);
    assert!(r.is_embedded());
    assert_eq!(r.to_uri(), "data:image/png;base64,AQID");
}

#[test]
fn data_url_rejects_malformed_input() {
    assert!(ImageRef::parse("data:image/png;base64").is_err());
    assert!(ImageRef::parse("data:image/png,plain").is_err());
    assert!(ImageRef::parse("data:image/png;base64,@@@").is_err());
}

#[test]
fn debug_hides_payload_bytes() {
    let r = ImageRef::from_bytes("image/png", vec![0u8; 4096]);
    let s = format!("{r:?}");
    assert!(s.contains("4096"));
    assert!(s.len() < 64);
}
