use std::path::Path;

use dyndiag::layout::compute_layout;
use dyndiag::{Language, LayoutConfig, Model, Theme, render_svg};

fn load_fixture(language_file: &str, model_file: &str) -> (Language, Model) {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");
    let language_source =
        std::fs::read_to_string(root.join(language_file)).expect("language fixture read failed");
    let model_source =
        std::fs::read_to_string(root.join(model_file)).expect("model fixture read failed");
    let language = Language::parse(&language_source).expect("language parse failed");
    let model = Model::parse(&model_source).expect("model parse failed");
    (language, model)
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        ("statechart.lang.json", "statechart.model.json"),
        ("entity.lang.json5", "entity.model.json"),
        ("overlay.lang.json", "overlay.model.json"),
    ];

    for (language_file, model_file) in candidates {
        let (language, model) = load_fixture(language_file, model_file);
        model.validate(&language).expect("model validation failed");
        let layout = compute_layout(&model, &language, &Theme::modern(), &LayoutConfig::default())
            .expect("layout failed");
        assert!(layout.width > 0.0, "{language_file}: empty canvas");
        assert!(layout.height > 0.0, "{language_file}: empty canvas");
        let svg = render_svg(&layout, &Theme::modern());
        assert_valid_svg(&svg, language_file);
    }
}

#[test]
fn overlay_fixture_resolves_absolute_children() {
    let (language, model) = load_fixture("overlay.lang.json", "overlay.model.json");
    let layout = compute_layout(&model, &language, &Theme::modern(), &LayoutConfig::default())
        .expect("layout failed");

    let panel = &layout.nodes[0];
    // flow children: 10 + gap 5 + 20; fixed absolute badge is 40 wide
    assert_eq!(panel.bounds.height, 35.0);
    assert_eq!(panel.bounds.width, 40.0);

    let shapes = &panel.shape.children;
    assert_eq!(shapes[0].bounds.y, 0.0);
    assert_eq!(shapes[1].bounds.y, 15.0);

    // percentage overlay resolves against the final container frame
    assert_eq!(shapes[2].bounds.width, 20.0);
    assert_eq!(shapes[2].bounds.height, 17.5);
    assert_eq!(shapes[2].bounds.y, 0.0);

    // fixed badge keeps its pixel bounds
    assert_eq!(shapes[3].bounds.width, 40.0);
    assert_eq!(shapes[3].bounds.height, 4.0);
}

#[test]
fn statechart_fixture_labels_are_bound() {
    let (language, model) = load_fixture("statechart.lang.json", "statechart.model.json");
    let layout = compute_layout(&model, &language, &Theme::modern(), &LayoutConfig::default())
        .expect("layout failed");
    let svg = render_svg(&layout, &Theme::modern());
    assert!(svg.contains("Red"));
    assert!(svg.contains("Green"));
    assert!(svg.contains("after 60s"));
    // dotted history transition
    assert!(svg.contains("stroke-dasharray"));
}

#[test]
fn entity_fixture_stacks_attribute_lines() {
    let (language, model) = load_fixture("entity.lang.json5", "entity.model.json");
    let layout = compute_layout(&model, &language, &Theme::modern(), &LayoutConfig::default())
        .expect("layout failed");

    let customer = layout
        .nodes
        .iter()
        .find(|node| node.id == "customer")
        .expect("customer node missing");
    let attributes = &customer.shape.children[1];
    let label = attributes.label.as_ref().expect("attribute label missing");
    assert_eq!(label.lines, vec!["id", "name", "email"]);
    // the three-line attribute list is taller than the one-line header
    assert!(attributes.bounds.height > customer.shape.children[0].bounds.height);
}

#[test]
fn layout_is_stable_across_runs() {
    let (language, model) = load_fixture("statechart.lang.json", "statechart.model.json");
    let theme = Theme::modern();
    let config = LayoutConfig::default();
    let first = compute_layout(&model, &language, &theme, &config).expect("layout failed");
    let second = compute_layout(&model, &language, &theme, &config).expect("layout failed");

    assert_eq!(first.width, second.width);
    assert_eq!(first.height, second.height);
    for (a, b) in first.nodes.iter().zip(second.nodes.iter()) {
        assert_eq!(a.bounds, b.bounds, "node {} moved between runs", a.id);
    }
}

#[test]
fn layout_dump_round_trips_to_json() {
    let (language, model) = load_fixture("overlay.lang.json", "overlay.model.json");
    let layout = compute_layout(&model, &language, &Theme::modern(), &LayoutConfig::default())
        .expect("layout failed");
    let dump = dyndiag::layout_dump::layout_dump_string(&layout).expect("dump failed");
    let value: serde_json::Value = serde_json::from_str(&dump).expect("dump is not valid JSON");
    assert_eq!(value["nodes"][0]["id"], "p1");
    assert_eq!(value["nodes"][0]["width"], 40.0);
}
