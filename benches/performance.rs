use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::Path;
use strata::core::{AnalysisConfig, EntityId, Levelizer, StructureAnalyzer, StructureTree};
use tempfile::TempDir;

/// `packages` directories of `modules` files each. Every module imports the
/// next one in its package and the first module of the next package; the
/// last package imports back into the first to force a cycle.
fn write_project(root: &Path, packages: usize, modules: usize) {
    for p in 0..packages {
        let dir = root.join(format!("pkg_{p}"));
        std::fs::create_dir_all(&dir).unwrap();
        for m in 0..modules {
            let mut content = String::new();
            if m + 1 < modules {
                content.push_str(&format!("import {{ v{} }} from './mod_{}';\n", m + 1, m + 1));
            }
            let next = (p + 1) % packages;
            content.push_str(&format!("import {{ v0 }} from '../pkg_{next}/mod_0';\n"));
            content.push_str(&format!("export const v{m} = {m};\n"));
            let ext = if m % 2 == 0 { "ts" } else { "js" };
            std::fs::write(dir.join(format!("mod_{m}.{ext}")), content).unwrap();
        }
    }
}

fn benchmark_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("structure_analysis");
    let analyzer = StructureAnalyzer::new().unwrap();

    let small = TempDir::new().unwrap();
    write_project(small.path(), 4, 5);
    let small_config = AnalysisConfig::new(small.path());
    group.bench_function("small_tree", |b| {
        b.iter(|| black_box(analyzer.analyze(black_box(&small_config))))
    });

    let large = TempDir::new().unwrap();
    write_project(large.path(), 20, 25);
    let large_config = AnalysisConfig::new(large.path());
    group.bench_function("large_tree", |b| {
        b.iter(|| black_box(analyzer.analyze(black_box(&large_config))))
    });

    group.finish();
}

fn benchmark_levelization(c: &mut Criterion) {
    let mut group = c.benchmark_group("levelization");

    // dense package: each module depends on every module before it, plus one
    // back edge per ten modules
    let mut tree = StructureTree::new("/bench", "bench");
    let root = tree.root();
    let modules: Vec<EntityId> = (0..200)
        .map(|i| {
            tree.add_module(
                root,
                format!("/bench/m{i}.ts"),
                format!("bench.m{i}.ts"),
                Vec::new(),
                Vec::new(),
            )
            .unwrap()
        })
        .collect();
    for (i, &from) in modules.iter().enumerate() {
        for &to in modules.iter().take(i).step_by(7) {
            tree.add_dependency(from, to);
        }
        if i % 10 == 9 {
            tree.add_dependency(modules[i - 9], from);
        }
    }

    group.bench_function("dense_package", |b| {
        b.iter(|| {
            let mut tree = tree.clone();
            black_box(Levelizer::new().levelize(&mut tree))
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_analysis, benchmark_levelization);
criterion_main!(benches);
