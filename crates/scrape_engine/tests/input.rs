use std::io::Write;

use pretty_assertions::assert_eq;
use scrape_engine::{parse_url_list, read_url_list, InputError};
use tempfile::NamedTempFile;

#[test]
fn first_field_of_each_record_is_the_url() {
    let csv = "http://a.example,ignored,fields\nhttp://b.example\n\"http://c.example/?q=1,2\",x\n";
    let urls = parse_url_list(csv.as_bytes()).unwrap();
    assert_eq!(
        urls,
        vec!["http://a.example", "http://b.example", "http://c.example/?q=1,2"]
    );
}

#[test]
fn empty_lines_are_ignored_but_blank_fields_kept() {
    let csv = "http://a.example\n\n,second-column-only\nhttp://b.example\n";
    let urls = parse_url_list(csv.as_bytes()).unwrap();
    assert_eq!(urls, vec!["http://a.example", "", "http://b.example"]);
}

#[test]
fn empty_input_yields_no_urls() {
    assert!(parse_url_list("".as_bytes()).unwrap().is_empty());
}

#[test]
fn reads_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "http://one.example").unwrap();
    writeln!(file, "http://two.example,2").unwrap();

    let urls = read_url_list(file.path()).unwrap();
    assert_eq!(urls, vec!["http://one.example", "http://two.example"]);
}

#[test]
fn missing_file_reports_path() {
    let err = read_url_list(std::path::Path::new("/no/such/urls.csv")).unwrap_err();
    assert!(matches!(err, InputError::Open { .. }));
    assert!(err.to_string().contains("/no/such/urls.csv"));
}

#[test]
fn invalid_utf8_is_an_error() {
    let err = parse_url_list(&b"http://ok\n\xff\xfe\n"[..]).unwrap_err();
    assert!(matches!(err, InputError::Csv(_)));
}
