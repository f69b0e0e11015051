use lookout_dom::snapshot::PageSnapshot;
use lookout_dom::{Document, DomError, ElementSpec, Path, Viewport};

#[test]
fn path_into_cross_origin_frame_is_a_miss() {
    let mut doc = Document::new("https://example.com/", Viewport::default());
    let frame = doc.append_element(doc.body(), ElementSpec::new("iframe").id("ad"));
    doc.block_frame(frame).unwrap();

    let path: Path = "iframe#ad >> button".parse().unwrap();
    assert_eq!(doc.resolve_path(&path), None);
    assert!(matches!(
        doc.frame_document(frame),
        Err(DomError::CrossOriginFrame(f)) if f == frame
    ));
}

#[test]
fn snapshot_frames_keep_their_own_base_url() {
    let json = r#"{
        "url": "https://example.com/",
        "viewport": { "width": 800, "height": 600 },
        "children": [
          { "kind": "element", "tag": "html", "rect": { "x": 0, "y": 0, "width": 800, "height": 600 },
            "children": [
              { "kind": "element", "tag": "body", "rect": { "x": 0, "y": 0, "width": 800, "height": 600 },
                "children": [
                  { "kind": "element", "tag": "iframe", "rect": { "x": 0, "y": 0, "width": 400, "height": 300 },
                    "frame": { "status": "loaded", "url": "https://cdn.example/widget/", "children": [
                      { "kind": "element", "tag": "html", "rect": { "x": 0, "y": 0, "width": 400, "height": 300 },
                        "children": [
                          { "kind": "element", "tag": "body", "rect": { "x": 0, "y": 0, "width": 400, "height": 300 },
                            "children": [
                              { "kind": "element", "tag": "a", "attrs": [["href", "help"]],
                                "rect": { "x": 5, "y": 5, "width": 50, "height": 20 } }
                            ] }
                        ] }
                    ] } }
                ] }
            ] }
        ]
    }"#;
    let snapshot = PageSnapshot::from_json(json).unwrap();
    let doc = Document::from_snapshot(&snapshot);

    let path: Path = "iframe >> a".parse().unwrap();
    let link = doc.resolve_path(&path).unwrap();
    assert_eq!(
        doc.absolute_href(link).as_deref(),
        Some("https://cdn.example/widget/help")
    );
    assert_eq!(doc.url(), "https://example.com/");
}

#[test]
fn removed_subtrees_disappear_from_queries() {
    let mut doc = Document::new("https://example.com/", Viewport::default());
    let body = doc.body();
    let overlay = doc.append_element(body, ElementSpec::new("div").class("overlay"));
    doc.append_element(overlay, ElementSpec::new("button").id("close"));

    assert_eq!(doc.select(body, "#close").unwrap().len(), 1);
    doc.remove(overlay);
    assert!(doc.select(body, "#close").unwrap().is_empty());
    assert!(doc.select(body, "div[class=").is_err());
}
