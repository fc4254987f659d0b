use lup::{build_line, parse_template, Config, ErrorKind, QuoteContext};

fn generate(line: &str) -> Vec<String> {
    build_line(line, &Config::default())
        .unwrap()
        .commands()
        .collect()
}

#[test]
fn template_black_box() {
    let parsed = parse_template("echo \"@a,b@\" @-:1..2@", &Config::default()).unwrap();
    assert_eq!(parsed.groups.len(), 2);
    assert_eq!(parsed.groups[0].quote, QuoteContext::Double);
    assert!(parsed.groups[1].hidden);
}

#[test]
fn three_groups_product_black_box() {
    let out = generate("@a,b@-@1..3@-@x,y@");
    assert_eq!(out.len(), 12);
    assert_eq!(out[0], "a-1-x");
    assert_eq!(out[1], "a-1-y");
    assert_eq!(out[2], "a-2-x");
    assert_eq!(out[11], "b-3-y");
}

#[test]
fn descending_range_black_box() {
    assert_eq!(
        generate("echo @9..7@"),
        vec!["echo 9", "echo 8", "echo 7"]
    );
}

#[test]
fn backref_to_hidden_group_black_box() {
    assert_eq!(
        generate("@-:red,blue@paint @1@ @1@"),
        vec!["paint red red", "paint blue blue"]
    );
}

#[test]
fn fatal_kinds_black_box() {
    let config = Config::default();
    let err = build_line("echo @1..1@", &config).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Range);
    let err = build_line("echo @a,b", &config).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Parse);
    assert!(err.display_with_input("echo @a,b").contains("near:"));
}
