use css_module_classes::{extract, ExtractArgs};
use std::fs;
use tempfile::tempdir;

#[tokio::test]
async fn test_end_to_end_class_list() {
    let temp_dir = tempdir().unwrap();

    let input = temp_dir.path().join("button.module.scss");
    fs::write(
        &input,
        r##"
        // Button styles
        $radius: 4px;

        .button {
            border-radius: $radius;

            &:hover { opacity: .9; }
            &.primary { background: blue; }

            .icon { width: 16px; }
        }

        .danger:not(.disabled) { color: red; }

        @media (max-width: 600px) {
            .button-small { padding: 2px; }
        }
    "##,
    )
    .unwrap();
    let output = temp_dir.path().join("button.txt");

    let result = extract(ExtractArgs::new(&input, &output)).await.unwrap();

    assert_eq!(result.class_list, "button,button-small,danger,disabled,icon,primary");
    assert_eq!(result.total_classes, 6);
    assert_eq!(fs::read_to_string(&output).unwrap(), result.class_list);
}

#[tokio::test]
async fn test_imports_merge_and_collapse_duplicates() {
    let temp_dir = tempdir().unwrap();
    fs::create_dir(temp_dir.path().join("partials")).unwrap();
    fs::write(
        temp_dir.path().join("partials/_typography.scss"),
        ".heading { font-weight: bold; } .card { font-size: 14px; }",
    )
    .unwrap();
    fs::write(temp_dir.path().join("reset.css"), ":global(.no-js) { display: none; }").unwrap();

    let input = temp_dir.path().join("card.module.scss");
    fs::write(
        &input,
        r#"
        @import "reset.css";
        @import 'partials/typography';

        .card { padding: 8px; }
        .footer {}
    "#,
    )
    .unwrap();
    let output = temp_dir.path().join("card.txt");

    let result = extract(ExtractArgs::new(&input, &output)).await.unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "card,footer,heading,no-js");
    assert_eq!(result.files.len(), 3);
}

#[tokio::test]
async fn test_global_names_are_literal() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("layout.module.css");
    fs::write(
        &input,
        r#"
        :global .App { margin: 0; }
        :global(.theme-dark) .panel {}
        .sidebar :global(.ReactModal__Overlay) {}
    "#,
    )
    .unwrap();
    let output = temp_dir.path().join("layout.txt");

    let result = extract(ExtractArgs::new(&input, &output)).await.unwrap();

    assert_eq!(result.class_list, "App,ReactModal__Overlay,panel,sidebar,theme-dark");
    assert_eq!(result.mapping.get("App"), Some("App"));
    assert_eq!(result.mapping.get("theme-dark"), Some("theme-dark"));
    assert_ne!(result.mapping.get("panel"), Some("panel"));
}

#[tokio::test]
async fn test_idempotent_output() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("grid.module.css");
    fs::write(&input, ".row {} .col {} .col-6 {} .col-12 {} .row:after {}").unwrap();
    let output = temp_dir.path().join("grid.txt");

    extract(ExtractArgs::new(&input, &output)).await.unwrap();
    let first = fs::read(&output).unwrap();
    extract(ExtractArgs::new(&input, &output)).await.unwrap();
    let second = fs::read(&output).unwrap();

    assert_eq!(first, second);
    assert_eq!(String::from_utf8(first).unwrap(), "col,col-12,col-6,row");
}

#[tokio::test]
async fn test_empty_input_gives_empty_file() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("empty.css");
    fs::write(&input, "").unwrap();
    let output = temp_dir.path().join("empty.txt");
    fs::write(&output, "stale content").unwrap();

    let result = extract(ExtractArgs::new(&input, &output)).await.unwrap();

    assert_eq!(result.total_classes, 0);
    assert_eq!(fs::metadata(&output).unwrap().len(), 0);
}

#[tokio::test]
async fn test_no_trailing_newline() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("one.css");
    fs::write(&input, ".only {}\n").unwrap();
    let output = temp_dir.path().join("one.txt");

    extract(ExtractArgs::new(&input, &output)).await.unwrap();

    assert_eq!(fs::read(&output).unwrap(), b"only");
}

#[tokio::test]
async fn test_manifest_output() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("nav.module.scss");
    fs::write(&input, ".link {} :global(.active) {} @keyframes slide { from { left: 0 } }").unwrap();
    let output = temp_dir.path().join("nav.txt");
    let manifest_path = temp_dir.path().join("nav.json");

    let mut args = ExtractArgs::new(&input, &output);
    args.manifest = Some(manifest_path.clone());
    args.scoped_name = Some("[name]__[local]".to_string());
    extract(args).await.unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "active,link,slide");

    let manifest: serde_json::Value = serde_json::from_str(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
    assert_eq!(manifest["metadata"]["classes_extracted"], 3);
    assert_eq!(manifest["metadata"]["scoped_name"], "[name]__[local]");
    assert_eq!(manifest["classes"]["link"], "nav_module__link");
    assert_eq!(manifest["classes"]["active"], "active");
    assert_eq!(manifest["classes"]["slide"], "nav_module__slide");
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("a.css");
    fs::write(&input, ".a {}").unwrap();
    let output = temp_dir.path().join("a.txt");

    let mut args = ExtractArgs::new(&input, &output);
    args.dry_run = true;
    let result = extract(args).await.unwrap();

    assert_eq!(result.class_list, "a");
    assert!(!output.exists());
}

#[tokio::test]
async fn test_config_file_load_paths() {
    let temp_dir = tempdir().unwrap();
    fs::create_dir(temp_dir.path().join("shared")).unwrap();
    fs::write(temp_dir.path().join("shared/_tokens.scss"), ".token-spacing {}").unwrap();
    fs::write(temp_dir.path().join("css-modules.yaml"), "load_paths:\n  - shared\n").unwrap();

    fs::create_dir(temp_dir.path().join("components")).unwrap();
    let input = temp_dir.path().join("components/list.module.scss");
    fs::write(&input, "@import 'tokens';\n.list {}").unwrap();
    let output = temp_dir.path().join("list.txt");

    let mut args = ExtractArgs::new(&input, &output);
    args.config = Some(temp_dir.path().join("css-modules.yaml"));
    extract(args).await.unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "list,token-spacing");
}

#[tokio::test]
async fn test_output_parent_directories_are_created() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("a.css");
    fs::write(&input, ".a {}").unwrap();
    let output = temp_dir.path().join("dist/generated/a.txt");

    extract(ExtractArgs::new(&input, &output)).await.unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "a");
}
