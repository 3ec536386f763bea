use std::time::Duration;

use adsmith::constants::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_IMAGES};
use adsmith::scrape::parse_page_url;
use adsmith::{SiteScraper, WizardError, extract_site};
use spectral::prelude::*;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>  Acme Skincare  </title>
  <meta name="description" content="Gentle skincare for everyone.">
  <meta property="og:image" content="https://cdn.acme.test/og.jpg">
</head>
<body>
  <h1>Glow naturally</h1>
  <h2>Organic</h2>
  <h2>Dermatologist tested</h2>
  <img src="/images/hero.jpg">
  <img src="/images/logo.png">
  <img src="/static/icon-cart.svg">
  <img src="/img/sprite-sheet.png">
  <img src="https://cdn.acme.test/og.jpg">
  <img src="/images/hero.jpg">
  <img src="products/serum.jpg">
  <p>Too short.</p>
  <p>Our serum is made from organic ingredients harvested by hand.</p>
</body>
</html>"#;

fn scraper() -> SiteScraper {
    SiteScraper::new(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS), DEFAULT_MAX_IMAGES)
        .expect("Expected a scraper.")
}

fn base() -> Url {
    Url::parse("https://acme.test/shop/").expect("Expected a valid URL.")
}

#[test]
fn extracts_title_description_and_text() {
    let site = extract_site(PAGE, &base(), 20);

    assert_that(&site.title).is_equal_to("Acme Skincare".to_owned());
    assert_that(&site.description).is_equal_to("Gentle skincare for everyone.".to_owned());
    assert_that(&site.text_content.h1).is_equal_to(vec!["Glow naturally".to_owned()]);
    assert_that(&site.text_content.h2)
        .is_equal_to(vec!["Organic".to_owned(), "Dermatologist tested".to_owned()]);
    assert_that(&site.text_content.paragraphs).is_equal_to(vec![
        "Our serum is made from organic ingredients harvested by hand.".to_owned(),
    ]);
}

#[test]
fn images_start_with_og_image_and_skip_decorations() {
    let site = extract_site(PAGE, &base(), 20);

    assert_that(&site.images).is_equal_to(vec![
        "https://cdn.acme.test/og.jpg".to_owned(),
        "https://acme.test/images/hero.jpg".to_owned(),
        "https://acme.test/shop/products/serum.jpg".to_owned(),
    ]);
}

#[test]
fn decoration_markers_match_case_sensitively() {
    let site = extract_site(
        r#"<img src="/LOGO.png"><img src="/Iconic-hero.jpg"><img src="/iconic.jpg">"#,
        &base(),
        20,
    );

    assert_that(&site.images).is_equal_to(vec![
        "https://acme.test/LOGO.png".to_owned(),
        "https://acme.test/Iconic-hero.jpg".to_owned(),
    ]);
}

#[test]
fn images_are_capped() {
    let html: String = (0..30)
        .map(|index| format!(r#"<img src="/photo-{index}.jpg">"#))
        .collect();

    let site = extract_site(&html, &base(), 20);

    assert_that(&site.images.len()).is_equal_to(20);
    assert_that(&site.images[0]).is_equal_to("https://acme.test/photo-0.jpg".to_owned());
}

#[test]
fn title_falls_back_to_h1_then_placeholder() {
    let from_h1 = extract_site("<h1>Heading title</h1>", &base(), 20);
    let missing = extract_site("<p>Nothing to see</p>", &base(), 20);

    assert_that(&from_h1.title).is_equal_to("Heading title".to_owned());
    assert_that(&missing.title).is_equal_to("No title".to_owned());
    assert_that(&missing.description.is_empty()).is_true();
}

#[test]
fn paragraphs_are_limited_to_ten() {
    let html: String = (0..15)
        .map(|index| format!("<p>Paragraph {index} has plenty of characters.</p>"))
        .collect();

    let site = extract_site(&html, &base(), 20);

    assert_that(&site.text_content.paragraphs.len()).is_equal_to(10);
}

#[test]
fn paragraphs_need_more_than_twenty_characters() {
    let site = extract_site("<p>12345678901234567890</p><p>123456789012345678901</p>", &base(), 20);

    assert_that(&site.text_content.paragraphs).is_equal_to(vec!["123456789012345678901".to_owned()]);
}

#[test]
fn screenshot_is_an_image_data_url() {
    let site = extract_site(PAGE, &base(), 20);

    assert_that(&site.screenshot.starts_with("data:image/svg+xml;base64,")).is_true();
}

#[test]
fn invalid_urls_are_validation_errors() {
    for input in ["", "   ", "not a url", "ftp://acme.test/file", "/relative/path"] {
        let result = parse_page_url(input);
        assert_that(&matches!(result, Err(WizardError::Validation(_)))).is_true();
    }
}

#[tokio::test]
async fn scrape_fetches_and_extracts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE, "text/html"))
        .mount(&server)
        .await;
    let scraper = SiteScraper::new(Duration::from_secs(5), 2).expect("Expected a scraper.");

    let site = scraper
        .scrape(&format!("{}/landing", server.uri()))
        .await
        .expect("Expected a scraped site.");

    assert_that(&site.title).is_equal_to("Acme Skincare".to_owned());
    assert_that(&site.images).is_equal_to(vec![
        "https://cdn.acme.test/og.jpg".to_owned(),
        format!("{}/images/hero.jpg", server.uri()),
    ]);
}

#[tokio::test]
async fn scrape_of_a_missing_page_is_an_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = scraper()
        .scrape(&format!("{}/gone", server.uri()))
        .await;

    assert_that(&matches!(result, Err(WizardError::Upstream(_)))).is_true();
}

#[tokio::test]
async fn scrape_of_an_invalid_url_is_a_validation_error() {
    let result = scraper().scrape("example dot com").await;

    assert_that(&matches!(result, Err(WizardError::Validation(_)))).is_true();
}

#[tokio::test]
async fn slow_pages_time_out_as_upstream_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(PAGE, "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let scraper = SiteScraper::new(Duration::from_millis(200), DEFAULT_MAX_IMAGES)
        .expect("Expected a scraper.");

    let result = scraper.scrape(&format!("{}/slow", server.uri())).await;

    assert_that(&matches!(result, Err(WizardError::Upstream(_)))).is_true();
}
