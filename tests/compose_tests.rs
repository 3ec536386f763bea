use std::collections::HashMap;

use adsmith::compose::{Backdrop, ComposeQuery, split_image_list};
use adsmith::{BannerSize, Composition, WizardError, render_svg};
use spectral::prelude::*;
use url::Url;

fn query(text: Option<&str>, bg: Option<&str>, color: Option<&str>, size: Option<&str>) -> ComposeQuery {
    ComposeQuery {
        text: text.map(str::to_owned),
        bg: bg.map(str::to_owned),
        color: color.map(str::to_owned),
        size: size.map(str::to_owned),
    }
}

fn composition(text: &str, backdrop: Backdrop, size: BannerSize) -> Composition {
    Composition {
        text: text.to_owned(),
        backdrop,
        color: "#F59E0B".to_owned(),
        size,
    }
}

#[test]
fn query_defaults_to_square_gradient_in_blue() {
    let composition =
        Composition::from_query(query(Some("Hello"), None, None, None), false).expect("Expected a composition.");

    assert_that(&composition).is_equal_to(Composition {
        text: "Hello".to_owned(),
        backdrop: Backdrop::Gradient,
        color: "#3B82F6".to_owned(),
        size: BannerSize::Square,
    });
}

#[test]
fn query_without_text_is_a_validation_error() {
    for text in [None, Some(""), Some("   ")] {
        let result = Composition::from_query(query(text, None, None, None), false);
        assert_that(&matches!(result, Err(WizardError::Validation(_)))).is_true();
    }
}

#[test]
fn query_with_bad_color_or_size_is_a_validation_error() {
    let bad_color = Composition::from_query(query(Some("Hi"), None, Some("blue"), None), false);
    let bad_size = Composition::from_query(query(Some("Hi"), None, None, Some("banner")), false);

    assert_that(&matches!(bad_color, Err(WizardError::Validation(_)))).is_true();
    assert_that(&matches!(bad_size, Err(WizardError::Validation(_)))).is_true();
}

#[test]
fn collage_query_splits_the_image_list() {
    let composition = Composition::from_query(
        query(
            Some("Hi"),
            Some("https://a.test/1.jpg,https://a.test/2.jpg"),
            None,
            Some("vertical"),
        ),
        true,
    )
    .expect("Expected a composition.");

    assert_that(&composition.backdrop).is_equal_to(Backdrop::Collage(vec![
        "https://a.test/1.jpg".to_owned(),
        "https://a.test/2.jpg".to_owned(),
    ]));
    assert_that(&composition.size).is_equal_to(BannerSize::Vertical);
}

#[test]
fn data_urls_survive_list_splitting() {
    let images = split_image_list("data:image/png;base64,AAAA, https://a.test/1.jpg,,data:image/svg+xml;base64,BBBB");

    assert_that(&images).is_equal_to(vec![
        "data:image/png;base64,AAAA".to_owned(),
        "https://a.test/1.jpg".to_owned(),
        "data:image/svg+xml;base64,BBBB".to_owned(),
    ]);
}

#[test]
fn data_url_without_payload_keeps_the_next_image() {
    let images = split_image_list("data:image/png;base64,,https://a.test/1.jpg,data:image/gif;base64");

    assert_that(&images).is_equal_to(vec![
        "data:image/png;base64,".to_owned(),
        "https://a.test/1.jpg".to_owned(),
        "data:image/gif;base64,".to_owned(),
    ]);
}

#[test]
fn query_url_round_trips_through_from_query() {
    let base = Url::parse("http://localhost:3000").expect("Expected a valid URL.");
    let original = composition(
        "Glow & shine",
        Backdrop::Image("https://a.test/bg.jpg?w=800".to_owned()),
        BannerSize::Vertical,
    );

    let url = original.to_query_url(&base);
    let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();

    assert_that(&url.path()).is_equal_to("/api/compose-banner");
    assert_that(&pairs["text"]).is_equal_to("Glow & shine".to_owned());
    assert_that(&pairs["bg"]).is_equal_to("https://a.test/bg.jpg?w=800".to_owned());
    assert_that(&pairs["size"]).is_equal_to("vertical".to_owned());

    let parsed = Composition::from_query(
        query(
            pairs.get("text").map(String::as_str),
            pairs.get("bg").map(String::as_str),
            pairs.get("color").map(String::as_str),
            pairs.get("size").map(String::as_str),
        ),
        false,
    )
    .expect("Expected a composition.");
    assert_that(&parsed).is_equal_to(original);
}

#[test]
fn collage_query_url_uses_the_collage_endpoint() {
    let base = Url::parse("https://banners.test/app/").expect("Expected a valid URL.");
    let collage = composition(
        "Hi",
        Backdrop::Collage(vec!["https://a.test/1.jpg".to_owned(), "https://a.test/2.jpg".to_owned()]),
        BannerSize::Square,
    );

    let url = collage.to_query_url(&base);
    let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();

    assert_that(&url.path()).is_equal_to("/api/compose-banner-collage");
    assert_that(&pairs["bg"]).is_equal_to("https://a.test/1.jpg,https://a.test/2.jpg".to_owned());
}

#[test]
fn svg_has_canvas_size_and_escaped_text() {
    let svg = render_svg(&composition(
        "Salt & <pepper>",
        Backdrop::Image("https://a.test/bg.jpg?a=1&b=2".to_owned()),
        BannerSize::Vertical,
    ));

    assert_that(&svg.contains(r#"width="1080" height="1920""#)).is_true();
    assert_that(&svg.contains("Salt &amp; &lt;pepper&gt;")).is_true();
    assert_that(&svg.contains("https://a.test/bg.jpg?a=1&amp;b=2")).is_true();
    assert_that(&svg.contains(r#"font-size="100""#)).is_true();
    assert_that(&svg.contains("feDropShadow")).is_true();
}

#[test]
fn gradient_svg_uses_the_accent_color() {
    let svg = render_svg(&composition("Hi", Backdrop::Gradient, BannerSize::Square));

    assert_that(&svg.contains(r##"stop-color="#F59E0B""##)).is_true();
    assert_that(&svg.contains(r#"font-size="80""#)).is_true();
}

#[test]
fn collage_svg_places_at_most_five_images() {
    let images: Vec<String> = (1..=7).map(|index| format!("https://a.test/{index}.jpg")).collect();

    let svg = render_svg(&composition("Hi", Backdrop::Collage(images), BannerSize::Square));

    assert_that(&svg.matches("<image ").count()).is_equal_to(5);
    assert_that(&svg.contains("https://a.test/6.jpg")).is_false();
    assert_that(&svg.contains(r#"font-size="72""#)).is_true();
}

#[test]
fn long_copy_wraps_into_several_lines() {
    let svg = render_svg(&composition(
        "A remarkably long advertising copy that cannot possibly fit on one line",
        Backdrop::Gradient,
        BannerSize::Square,
    ));

    assert_that(&(svg.matches("<tspan").count() > 1)).is_true();
}
