use std::fs;
use strata::parsers::cpp::CppIncludeExtractor;
use strata::parsers::ImportExtractor;

#[test]
fn cpp_extractor_reports_quoted_includes_in_source_order() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("widget.cpp");
    let code = r#"
#include "widget.h"
#include <vector>
// #include "commented.h"
#ifdef FEATURE_EXTRA
#include "feature/extra.h"
#endif

namespace ui {
int size() { return 1; }
}
"#;
    fs::write(&file, code).unwrap();

    let extractor = CppIncludeExtractor::new();
    let includes = extractor.extract_imports(&file).unwrap();

    assert_eq!(includes, vec!["widget.h", "feature/extra.h"]);
    assert_eq!(extractor.language_name(), "cpp");
}
