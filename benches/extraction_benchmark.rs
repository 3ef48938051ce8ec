use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use css_module_classes::{extract, ClassNameExtractor, ExtractArgs, SourceDocument};
use std::fs;
use tempfile::TempDir;

/// Generate a stylesheet with `rules` nested SCSS rules
fn generate_stylesheet(rules: usize) -> String {
    let mut content = String::from("// generated\n$gap: 4px;\n\n");
    for i in 0..rules {
        content.push_str(&format!(
            ".card-{i} {{\n  padding: $gap;\n  &:hover {{ opacity: .8; }}\n  .title-{i}, .body-{i}:not(.hidden) {{ margin: 0; }}\n  :global(.theme-{m}) & {{ color: red; }}\n}}\n",
            i = i,
            m = i % 7
        ));
        if i % 25 == 0 {
            content.push_str(&format!(
                "@media (max-width: {}px) {{ .compact-{} {{ display: none; }} }}\n",
                600 + i,
                i
            ));
        }
    }
    content
}

fn bench_process_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_document");
    let extractor = ClassNameExtractor::new();

    for rules in [10, 100, 1000] {
        let document = SourceDocument::from_string("bench.module.scss", generate_stylesheet(rules));
        group.bench_with_input(BenchmarkId::from_parameter(rules), &document, |b, document| {
            b.iter(|| {
                let extraction = extractor.process_document(black_box(document)).unwrap();
                black_box(extraction.class_list())
            });
        });
    }

    group.finish();
}

fn bench_extract_with_imports(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..10 {
        fs::write(temp_dir.path().join(format!("_part-{}.scss", i)), generate_stylesheet(20)).unwrap();
    }
    let imports: String = (0..10).map(|i| format!("@import 'part-{}';\n", i)).collect();
    let input = temp_dir.path().join("app.module.scss");
    fs::write(&input, format!("{}{}", imports, generate_stylesheet(50))).unwrap();
    let output = temp_dir.path().join("app.txt");

    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("extract_with_imports", |b| {
        b.iter(|| {
            rt.block_on(async {
                let result = extract(ExtractArgs::new(&input, &output)).await.unwrap();
                black_box(result.total_classes)
            })
        });
    });
}

criterion_group!(benches, bench_process_document, bench_extract_with_imports);
criterion_main!(benches);
