use lookout_config::{ContentSettings, ScanSettings, SuppressionSettings};
use lookout_dom::{Document, ElementSpec, NodeId, Position, Rect, StyleProperty, Viewport};
use lookout_perception::som::marker::{self, MARKER_CONTAINER_ID};
use lookout_perception::{AnnoyanceSuppressor, ContentExtractor, SomBuilder};

fn page() -> Document {
    Document::new("https://shop.example/", Viewport::new(1280.0, 720.0))
}

fn button(doc: &mut Document, parent: NodeId, text: &str, rect: Rect) -> NodeId {
    let b = doc.append_element(
        parent,
        ElementSpec::new("button").rect(rect.x, rect.y, rect.width, rect.height),
    );
    doc.append_text(b, text);
    b
}

fn no_markers() -> ScanSettings {
    ScanSettings {
        draw_markers: false,
        ..ScanSettings::default()
    }
}

#[test]
fn iframe_button_gets_absolute_coordinates() {
    let mut doc = page();
    let body = doc.body();
    let frame = doc.append_element(
        body,
        ElementSpec::new("iframe").id("checkout").rect(100.0, 50.0, 400.0, 300.0),
    );
    let content = doc.attach_frame(frame, "https://shop.example/pay").unwrap();
    let inner_body = doc.body_of(content).unwrap();
    button(&mut doc, inner_body, "Pay", Rect::new(10.0, 10.0, 40.0, 20.0));

    let result = SomBuilder::new(&no_markers()).scan(&mut doc);
    assert_eq!(result.items.len(), 1);
    let item = &result.items[0];
    assert_eq!(item.rect, Rect::new(110.0, 60.0, 40.0, 20.0));
    assert_eq!((item.rect.right(), item.rect.bottom()), (150.0, 80.0));
    assert_eq!((item.center.x, item.center.y), (130.0, 70.0));
    assert_eq!(item.tag, "BUTTON");
    assert_eq!(item.path.to_string(), "iframe#checkout >> button");
    assert_eq!(doc.resolve_path(&item.path), item.node);
}

#[test]
fn framework_generated_ids_round_trip_through_paths() {
    let mut doc = page();
    let body = doc.body();
    let b = doc.append_element(
        body,
        ElementSpec::new("button").id(":r1:").rect(10.0, 10.0, 60.0, 24.0),
    );
    doc.append_text(b, "Menu");

    let result = SomBuilder::new(&no_markers()).scan(&mut doc);
    assert_eq!(result.items.len(), 1);
    let item = &result.items[0];
    assert_eq!(item.path.to_string(), r"button#\:r1\:");
    assert_eq!(doc.resolve_path(&item.path), Some(b));
}

#[test]
fn tiny_search_input_borrows_ancestor_geometry() {
    let mut doc = page();
    let body = doc.body();
    let wrapper = doc.append_element(body, ElementSpec::new("div").rect(300.0, 20.0, 200.0, 40.0));
    doc.append_element(
        wrapper,
        ElementSpec::new("input")
            .attr("type", "search")
            .id("q")
            .rect(310.0, 30.0, 2.0, 2.0),
    );

    let result = SomBuilder::new(&no_markers()).scan(&mut doc);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].rect, Rect::new(300.0, 20.0, 200.0, 40.0));
    assert_eq!(result.items[0].path.to_string(), "input#q");
}

#[test]
fn tiny_pointer_div_is_dropped() {
    let mut doc = page();
    let body = doc.body();
    let div = doc.append_element(
        body,
        ElementSpec::new("div").cursor("pointer").rect(10.0, 10.0, 5.0, 5.0),
    );
    doc.append_text(div, "x");

    let result = SomBuilder::new(&no_markers()).scan(&mut doc);
    assert!(result.items.is_empty());
    assert_eq!(result.debug.total_candidates, 1);
    assert_eq!(result.debug.filtered, 1);
}

#[test]
fn item_count_is_capped_and_counters_add_up() {
    let mut doc = page();
    let body = doc.body();
    for i in 0..350 {
        let x = f64::from(i % 30) * 40.0;
        let y = f64::from(i / 30) * 30.0;
        button(&mut doc, body, &format!("b{i}"), Rect::new(x, y, 30.0, 20.0));
    }
    let result = SomBuilder::new(&no_markers()).scan(&mut doc);
    let debug = &result.debug;
    assert_eq!(result.items.len(), 300);
    assert_eq!(debug.total, 300);
    assert_eq!(debug.processed, 350);
    assert_eq!(debug.filtered, 50);
    assert_eq!(debug.processed, debug.total + debug.filtered);
    assert_eq!(debug.viewport, "1280x720");
    assert!(result.items.iter().enumerate().all(|(i, item)| item.id == i));
}

#[test]
fn sizes_respect_the_minimum_except_search_inputs() {
    let mut doc = page();
    let body = doc.body();
    button(&mut doc, body, "ok", Rect::new(0.0, 0.0, 15.0, 15.0));
    button(&mut doc, body, "thin", Rect::new(0.0, 20.0, 100.0, 14.0));
    doc.append_element(body, ElementSpec::new("input").attr("name", "q").rect(0.0, 40.0, 10.0, 10.0));

    let result = SomBuilder::new(&no_markers()).scan(&mut doc);
    let kept: Vec<_> = result.items.iter().map(|i| (i.tag.as_str(), i.rect.width)).collect();
    assert_eq!(kept, vec![("BUTTON", 15.0), ("INPUT", 10.0)]);
}

#[test]
fn rescanning_is_deterministic_and_replaces_markers() {
    let mut doc = page();
    let body = doc.body();
    let nav = doc.append_element(body, ElementSpec::new("nav").rect(0.0, 0.0, 1280.0, 40.0));
    let a = doc.append_element(nav, ElementSpec::new("a").attr("href", "/cart").rect(10.0, 10.0, 60.0, 20.0));
    doc.append_text(a, "Cart");
    let host = doc.append_element(body, ElementSpec::new("shop-card").class("card featured promo"));
    let shadow = doc.attach_shadow_root(host).unwrap();
    button(&mut doc, shadow, "Add to cart", Rect::new(20.0, 100.0, 120.0, 30.0));
    let tile = doc.append_element(
        body,
        ElementSpec::new("div").cursor("pointer").rect(200.0, 100.0, 100.0, 100.0),
    );
    doc.append_text(tile, "Deal of the day");

    let settings = ScanSettings::default();
    let first = SomBuilder::new(&settings).scan(&mut doc);
    let second = SomBuilder::new(&settings).scan(&mut doc);
    assert_eq!(first.items, second.items);

    let order: Vec<_> = first.items.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(order, vec!["Add to cart", "Cart", "Deal of the day"]);
    assert_eq!(
        first.items[0].path.to_string(),
        "shop-card.card.featured >> shadow-root >> button"
    );
    assert_eq!(first.items[1].href.as_deref(), Some("https://shop.example/cart"));

    let container = marker::find_container(&doc).unwrap();
    assert_eq!(doc.attr(container, "id"), Some(MARKER_CONTAINER_ID));
    assert_eq!(doc.children(container).len(), 3);
    assert_eq!(doc.select(body, "#agent-som-container").unwrap().len(), 1);
}

#[test]
fn page_coordinates_include_scroll() {
    let mut doc = Document::new("https://shop.example/", Viewport::new(1000.0, 600.0).with_scroll(0.0, 400.0));
    let body = doc.body();
    button(&mut doc, body, "Buy", Rect::new(100.0, 50.0, 80.0, 30.0));
    let result = SomBuilder::new(&no_markers()).scan(&mut doc);
    let item = &result.items[0];
    assert_eq!(item.rect, Rect::new(100.0, 450.0, 80.0, 30.0));
    assert_eq!((item.viewport_center.x, item.viewport_center.y), (140.0, 65.0));
    assert_eq!((item.center.x, item.center.y), (140.0, 465.0));
}

#[test]
fn suppression_requires_the_overlay_predicate() {
    let mut doc = page();
    let body = doc.body();
    let consent = doc.append_element(
        body,
        ElementSpec::new("div")
            .id("cookie-consent")
            .position(Position::Fixed)
            .z_index(9999)
            .rect(0.0, 600.0, 1280.0, 120.0),
    );
    let info = doc.append_element(body, ElementSpec::new("div").class("cookie-info"));
    doc.append_text(info, "How we use cookies on this site.");
    doc.set_style(body, StyleProperty::Overflow, "hidden");

    let mut suppressor = AnnoyanceSuppressor::new(&SuppressionSettings::default());
    let report = suppressor.attach(&mut doc);
    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.removed[0].node, Some(consent));
    assert!(report.scroll_changed);
    assert!(!doc.is_connected(consent));
    assert!(doc.is_connected(info));
    assert!(!doc.has_pending_mutations());
}

#[test]
fn injected_overlays_are_removed_on_mutation() {
    let mut doc = page();
    let body = doc.body();
    let mut suppressor = AnnoyanceSuppressor::new(&SuppressionSettings::default());
    assert!(suppressor.attach(&mut doc).removed.is_empty());

    let modal = doc.append_element(
        body,
        ElementSpec::new("div")
            .class("newsletter-modal")
            .position(Position::Absolute),
    );
    let report = suppressor.settle(&mut doc);
    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.removed[0].rule, "[class*=\"newsletter\" i]");
    assert!(!doc.is_connected(modal));
    assert!(!doc.has_pending_mutations());

    // style-only changes do not trigger a pass
    let before = suppressor.passes();
    doc.set_style(body, StyleProperty::Display, "flex");
    let records = doc.take_mutations();
    assert!(suppressor.on_mutations(&mut doc, &records).is_none());
    assert_eq!(suppressor.passes(), before);
}

#[test]
fn longest_dense_article_is_main_content() {
    let mut doc = page();
    let body = doc.body();
    let mut articles = Vec::new();
    for len in [600usize, 800, 300] {
        let article = doc.append_element(body, ElementSpec::new("article").rect(0.0, 0.0, 800.0, 200.0));
        let p = doc.append_element(article, ElementSpec::new("p"));
        doc.append_text(p, &"a".repeat(len));
        articles.push(article);
    }

    let settings = ContentSettings::default();
    let record = ContentExtractor::new(&settings).extract(&doc);
    assert_eq!(record.main_content, "a".repeat(800));
    assert_eq!(record.page_info.url, "https://shop.example/");
}

#[test]
fn content_record_collects_page_info() {
    let mut doc = page();
    let html = doc.document_element(doc.root()).unwrap();
    let head = doc.children(html)[0];
    doc.append_element(
        head,
        ElementSpec::new("meta").attr("name", "description").attr("content", "Cheap widgets"),
    );
    let title = doc.append_element(head, ElementSpec::new("title"));
    doc.append_text(title, "Widgets");
    let body = doc.body();
    let h1 = doc.append_element(body, ElementSpec::new("h1").rect(0.0, 0.0, 400.0, 40.0));
    doc.append_text(h1, "All widgets");

    let settings = ContentSettings::default();
    let record = ContentExtractor::new(&settings).extract(&doc);
    assert_eq!(record.page_info.title, "Widgets");
    assert_eq!(record.page_info.main_topic.as_deref(), Some("All widgets"));
    assert_eq!(record.page_info.description.as_deref(), Some("Cheap widgets"));
    assert_eq!(record.main_content, "All widgets");
}

#[test]
fn scan_result_serializes_with_camel_case_names() {
    let mut doc = page();
    let body = doc.body();
    button(&mut doc, body, "Go", Rect::new(0.0, 0.0, 40.0, 20.0));
    let result = SomBuilder::new(&no_markers()).scan(&mut doc);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["debug"]["totalCandidates"], 1);
    assert_eq!(json["items"][0]["viewportCenter"]["x"], 20.0);
    assert_eq!(json["items"][0]["path"], "button");
    assert!(json.get("markers").is_none());
}
