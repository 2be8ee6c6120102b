mod common;

use common::{FailAfter, GIF, JPEG, PDF, PNG, decode, named};
use formdata_serde::{
    Encoder, Error, File, Sniffer, UnsupportedPolicy, detect_extension, to_form, to_writer,
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Profile {
    name: String,
    email: String,
    is_active: bool,
    visits: u64,
}

#[test]
fn test_scalar_fields() {
    #[derive(Serialize)]
    struct Req {
        name: String,
        email: String,
        is_active: bool,
        visits: u64,
    }

    let form = to_form(&Req {
        name: "John Doe".into(),
        email: "john@example.com".into(),
        is_active: true,
        visits: 12,
    })
    .unwrap();
    let parts = decode(&form);
    let names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["name", "email", "is_active", "visits"]);
    assert_eq!(parts[0].text(), "John Doe");
    assert_eq!(parts[1].text(), "john@example.com");
    assert_eq!(parts[2].text(), "true");
    assert_eq!(parts[3].text(), "12");
    assert!(parts.iter().all(|p| p.filename.is_none()));
    assert_eq!(form.part_count(), 4);
}

#[test]
fn test_keys_sent_verbatim() {
    #[derive(Serialize)]
    struct Req {
        #[serde(rename = "X-Request-ID")]
        id: u32,
        #[serde(rename = "userName")]
        user_name: String,
    }

    let form = to_form(&Req {
        id: 7,
        user_name: "ann".into(),
    })
    .unwrap();
    let parts = decode(&form);
    let names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["X-Request-ID", "userName"]);
    assert_eq!(parts[0].text(), "7");
}

#[test]
fn test_lowercase_keys() {
    let p = Profile {
        name: "a".into(),
        email: "b".into(),
        is_active: false,
        visits: 0,
    };
    let names: Vec<_> = decode(&to_form(&p).unwrap())
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["Name", "Email", "IsActive", "Visits"]);

    let form = Encoder::new().lowercase_keys(true).encode(&p).unwrap();
    let names: Vec<_> = decode(&form).into_iter().map(|p| p.name).collect();
    assert_eq!(names, ["name", "email", "isactive", "visits"]);
}

#[test]
fn test_rename_and_skip_sentinel() {
    #[derive(Serialize)]
    struct Req {
        #[serde(rename = "user_age")]
        age: i32,
        #[serde(rename = "-")]
        ignore_field: String,
        #[serde(skip)]
        _also_ignored: String,
    }

    let form = to_form(&Req {
        age: 30,
        ignore_field: "This should be ignored".into(),
        _also_ignored: "so should this".into(),
    })
    .unwrap();
    let parts = decode(&form);
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "user_age");
    assert_eq!(parts[0].text(), "30");
    let body = String::from_utf8_lossy(form.body());
    assert!(!body.contains("ignored"));
}

#[test]
fn test_empty_text_omitted_zero_kept() {
    #[derive(Serialize)]
    struct Req {
        note: String,
        count: i64,
        ratio: f64,
        enabled: bool,
    }

    let form = to_form(&Req {
        note: String::new(),
        count: 0,
        ratio: 0.0,
        enabled: false,
    })
    .unwrap();
    let parts = decode(&form);
    assert!(named(&parts, "note").is_empty());
    assert_eq!(named(&parts, "count")[0].text(), "0");
    assert_eq!(named(&parts, "ratio")[0].text(), "0");
    assert_eq!(named(&parts, "enabled")[0].text(), "false");
}

#[test]
fn test_integer_extremes() {
    #[derive(Serialize)]
    struct Req {
        a: i8,
        b: i64,
        c: u64,
        d: u128,
        e: char,
    }

    let form = to_form(&Req {
        a: -128,
        b: i64::MIN,
        c: u64::MAX,
        d: u128::MAX,
        e: 'é',
    })
    .unwrap();
    let parts = decode(&form);
    assert_eq!(parts[0].text(), "-128");
    assert_eq!(parts[1].text(), "-9223372036854775808");
    assert_eq!(parts[2].text(), "18446744073709551615");
    assert_eq!(parts[3].text(), "340282366920938463463374607431768211455");
    assert_eq!(parts[4].text(), "é");
}

#[test]
fn test_float_formatting() {
    #[derive(Serialize)]
    struct Req {
        price: f64,
        big: f64,
        single: f32,
        neg: f64,
    }

    let form = to_form(&Req {
        price: 19.99,
        big: 1e21,
        single: 0.1,
        neg: -2.0,
    })
    .unwrap();
    let parts = decode(&form);
    assert_eq!(parts[0].text(), "19.99");
    assert_eq!(parts[1].text(), "1000000000000000000000");
    assert_eq!(parts[2].text(), "0.10000000149011612");
    assert_eq!(parts[3].text(), "-2");
}

#[test]
fn test_explicit_filename_bypasses_sniffing() {
    #[derive(Serialize)]
    struct Req {
        #[serde(rename = "avatar")]
        profile_pic: File,
    }

    let form = to_form(&Req {
        profile_pic: File::named("profile.jpg", PNG.to_vec()),
    })
    .unwrap();
    let parts = decode(&form);
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "avatar");
    assert_eq!(parts[0].filename.as_deref(), Some("profile.jpg"));
    assert_eq!(parts[0].data, PNG);
    assert_eq!(
        parts[0].content_type.as_deref(),
        Some("application/octet-stream")
    );
}

#[test]
fn test_sniffed_filenames() {
    #[derive(Serialize)]
    struct Req {
        #[serde(with = "serde_bytes")]
        png: Vec<u8>,
        #[serde(with = "serde_bytes")]
        jpeg: Vec<u8>,
        #[serde(with = "serde_bytes")]
        gif: Vec<u8>,
        #[serde(with = "serde_bytes")]
        pdf: Vec<u8>,
        unnamed: File,
    }

    let form = to_form(&Req {
        png: PNG.to_vec(),
        jpeg: JPEG.to_vec(),
        gif: GIF.to_vec(),
        pdf: PDF.to_vec(),
        unnamed: File::new(PNG.to_vec()),
    })
    .unwrap();
    let filenames: Vec<_> = decode(&form)
        .into_iter()
        .map(|p| p.filename.unwrap())
        .collect();
    assert_eq!(
        filenames,
        ["png.png", "jpeg.jpg", "gif.gif", "pdf.pdf", "unnamed.png"]
    );
}

#[test]
fn test_unknown_content_gets_bare_name() {
    #[derive(Serialize)]
    struct Req {
        #[serde(with = "serde_bytes")]
        blob: Vec<u8>,
        #[serde(with = "serde_bytes")]
        tiny: Vec<u8>,
    }

    let req = Req {
        blob: vec![0x00, 0x01, 0x02, 0x03],
        tiny: vec![0x00, 0x01],
    };
    assert_eq!(detect_extension(&req.tiny), "");

    let parts = decode(&to_form(&req).unwrap());
    assert_eq!(parts[0].filename.as_deref(), Some("blob"));
    assert_eq!(parts[1].filename.as_deref(), Some("tiny"));
    assert_eq!(parts[1].data, [0x00, 0x01]);

    let form = Encoder::new().default_extension(".bin").encode(&req).unwrap();
    let parts = decode(&form);
    assert_eq!(parts[0].filename.as_deref(), Some("blob.bin"));
}

#[test]
fn test_missing_bytes_omitted() {
    #[derive(Serialize)]
    struct Req {
        title: String,
        #[serde(with = "serde_bytes")]
        attachment: Option<Vec<u8>>,
        cover: Option<File>,
    }

    let parts = decode(
        &to_form(&Req {
            title: "t".into(),
            attachment: None,
            cover: None,
        })
        .unwrap(),
    );
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "title");
}

#[test]
fn test_custom_sniffer() {
    struct AlwaysWebp;

    impl Sniffer for AlwaysWebp {
        fn sniff(&self, _bytes: &[u8]) -> Option<mime::Mime> {
            Some("image/webp".parse().unwrap())
        }
        fn extension_for(&self, _mime: &mime::Mime) -> Option<String> {
            Some("webp".into())
        }
    }

    #[derive(Serialize)]
    struct Req {
        #[serde(with = "serde_bytes")]
        image: Vec<u8>,
    }

    let form = Encoder::new()
        .sniffer(AlwaysWebp)
        .encode(&Req { image: vec![1, 2, 3] })
        .unwrap();
    assert_eq!(decode(&form)[0].filename.as_deref(), Some("image.webp"));
}

#[test]
fn test_sequence_repeats_name() {
    #[derive(Serialize)]
    struct Req {
        tags: Vec<String>,
        numbers: Vec<i32>,
        ids: [u16; 2],
        raw: Vec<u8>,
    }

    let form = to_form(&Req {
        tags: vec!["golang".into(), "multipart".into()],
        numbers: vec![1, 2, 3],
        ids: [7, 8],
        raw: vec![9],
    })
    .unwrap();
    let parts = decode(&form);

    let tags: Vec<_> = named(&parts, "tags").iter().map(|p| p.text()).collect();
    assert_eq!(tags, ["golang", "multipart"]);
    let numbers: Vec<_> = named(&parts, "numbers").iter().map(|p| p.text()).collect();
    assert_eq!(numbers, ["1", "2", "3"]);
    let ids: Vec<_> = named(&parts, "ids").iter().map(|p| p.text()).collect();
    assert_eq!(ids, ["7", "8"]);
    let raw: Vec<_> = named(&parts, "raw").iter().map(|p| p.text()).collect();
    assert_eq!(raw, ["9"]);
}

#[test]
fn test_empty_and_missing_sequences() {
    #[derive(Serialize)]
    struct Req {
        tags: Vec<String>,
        labels: Option<Vec<String>>,
        keep: u8,
    }

    let form = to_form(&Req {
        tags: vec![],
        labels: None,
        keep: 1,
    })
    .unwrap();
    let parts = decode(&form);
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "keep");
}

#[test]
fn test_sequence_unsupported_elements() {
    #[derive(Serialize)]
    struct Req {
        scores: Vec<f64>,
    }

    let req = Req {
        scores: vec![1.5, 2.5],
    };
    match to_form(&req) {
        Err(Error::Unsupported { field, kind }) => {
            assert_eq!(field, "scores");
            assert_eq!(kind, "float element");
        }
        other => panic!("expected Unsupported, got {:?}", other),
    }

    let form = Encoder::new()
        .unsupported(UnsupportedPolicy::Skip)
        .encode(&req)
        .unwrap();
    assert_eq!(form.part_count(), 0);
}

#[test]
fn test_nested_struct_as_json() {
    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct UserInfo {
        address: String,
        phone: String,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Req {
        user_info: UserInfo,
    }

    let form = to_form(&Req {
        user_info: UserInfo {
            address: "123 Main St".into(),
            phone: "555-1234".into(),
        },
    })
    .unwrap();
    let parts = decode(&form);
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "UserInfo");
    assert!(parts[0].filename.is_none());

    let json: serde_json::Value = serde_json::from_slice(&parts[0].data).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "Address": "123 Main St", "Phone": "555-1234" })
    );
}

#[test]
fn test_unit_variant_as_text() {
    #[derive(Serialize)]
    #[allow(dead_code)]
    enum Visibility {
        Public,
        Private,
    }

    #[derive(Serialize)]
    struct Req {
        visibility: Visibility,
    }

    let parts = decode(
        &to_form(&Req {
            visibility: Visibility::Private,
        })
        .unwrap(),
    );
    assert_eq!(parts[0].text(), "Private");
}

#[test]
fn test_map_field_policy() {
    #[derive(Serialize)]
    struct Req {
        name: String,
        extra: BTreeMap<String, String>,
    }

    let req = Req {
        name: "x".into(),
        extra: BTreeMap::from([("k".to_string(), "v".to_string())]),
    };
    assert!(matches!(
        to_form(&req),
        Err(Error::Unsupported { ref field, kind: "map" }) if field == "extra"
    ));

    let form = Encoder::new()
        .unsupported(UnsupportedPolicy::Skip)
        .encode(&req)
        .unwrap();
    let parts = decode(&form);
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "name");
}

#[test]
fn test_data_enum_field_rejected() {
    #[derive(Serialize)]
    enum Shape {
        Circle(f64),
    }

    #[derive(Serialize)]
    struct Req {
        shape: Shape,
    }

    let err = to_form(&Req {
        shape: Shape::Circle(1.0),
    })
    .unwrap_err();
    assert!(matches!(err, Error::Unsupported { kind: "enum newtype variant", .. }));
}

#[test]
fn test_non_struct_input_rejected() {
    assert!(matches!(to_form(&42), Err(Error::InvalidInput(_))));
    assert!(matches!(to_form("text"), Err(Error::InvalidInput(_))));
    assert!(matches!(to_form(&vec![1, 2]), Err(Error::InvalidInput(_))));
    let map: BTreeMap<String, String> = BTreeMap::new();
    assert!(matches!(to_form(&map), Err(Error::InvalidInput(_))));
    assert!(matches!(
        to_form(&File::new(vec![1])),
        Err(Error::InvalidInput(_))
    ));
    let none: Option<Profile> = None;
    assert!(matches!(to_form(&none), Err(Error::InvalidInput(_))));
    assert!(matches!(to_form(&5i128), Err(Error::InvalidInput(_))));
    assert!(matches!(to_form(&5u128), Err(Error::InvalidInput(_))));
}

#[test]
fn test_indirection_accepted() {
    #[derive(Serialize)]
    struct Req {
        id: u32,
    }

    #[derive(Serialize)]
    struct Wrapper(Req);

    let boxed = Box::new(Req { id: 1 });
    assert_eq!(to_form(&boxed).unwrap().part_count(), 1);
    assert_eq!(to_form(&Some(Req { id: 2 })).unwrap().part_count(), 1);
    assert_eq!(to_form(&Wrapper(Req { id: 3 })).unwrap().part_count(), 1);
}

#[test]
fn test_write_failure_aborts() {
    #[derive(Serialize)]
    struct Req {
        a: String,
        b: String,
    }

    let req = Req {
        a: "first".into(),
        b: "second".into(),
    };
    let mut sink = FailAfter::new(10);
    let err = to_writer(&mut sink, &req).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "{:?}", err);
    assert!(sink.written <= 10);
}

#[test]
fn test_finalize_failure_wrapped() {
    #[derive(Serialize)]
    struct Empty {}

    let err = to_writer(FailAfter::new(0), &Empty {}).unwrap_err();
    assert!(matches!(err, Error::Finalize(_)), "{:?}", err);
    assert!(err.to_string().starts_with("failed to close multipart writer"));
}

#[test]
fn test_to_writer_matches_content_type() {
    let p = Profile {
        name: "n".into(),
        email: "e".into(),
        is_active: true,
        visits: 1,
    };
    let mut body = Vec::new();
    let content_type = to_writer(&mut body, &p).unwrap();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap();
    assert!(body.starts_with(format!("--{}\r\n", boundary).as_bytes()));
    assert!(body.ends_with(format!("\r\n--{}--\r\n", boundary).as_bytes()));

    let parts = common::decode_body(body, &content_type);
    assert_eq!(parts.len(), 4);
}

#[test]
fn test_empty_struct_body() {
    #[derive(Serialize)]
    struct Empty {}

    let form = to_form(&Empty {}).unwrap();
    assert_eq!(form.part_count(), 0);
    assert_eq!(form.body(), format!("--{}--\r\n", form.boundary()).as_bytes());
}

#[test]
fn test_into_parts() {
    #[derive(Serialize)]
    struct Req {
        id: u32,
    }

    let form = to_form(&Req { id: 5 }).unwrap();
    let expected_type = form.content_type();
    let expected_body = form.body().to_vec();
    let (body, content_type) = form.into_parts();
    assert_eq!(body, expected_body);
    assert_eq!(content_type, expected_type);
}
