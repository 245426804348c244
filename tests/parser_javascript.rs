use std::fs;
use strata::core::ErrorKind;
use strata::parsers::javascript::JavaScriptScanner;
use strata::parsers::ImportExtractor;

fn scan(source: &str) -> Vec<String> {
    JavaScriptScanner::new().unwrap().scan_source(source)
}

#[test]
fn scanner_extracts_default_named_and_namespace_imports() {
    let code = r#"
import Default from "./default";
import { one } from './one';
import { two, three as four } from "./many";
import * as ns from "../shared/ns";
import React, { useState } from "react";
import type { Shape } from "./types";
import "./side-effect.css";
export * from "./reexported";
export { five } from "./five.mjs";
"#;

    assert_eq!(
        scan(code),
        vec![
            "./default.js",
            "./one.js",
            "./many.js",
            "../shared/ns.js",
            "react.js",
            "./types.js",
            "./side-effect.css",
            "./reexported.js",
            "./five.mjs",
        ]
    );
}

#[test]
fn scanner_joins_imports_spanning_several_lines() {
    let code = r#"
import {
  alpha,
  beta, // trailing comment
  gamma,
} from "./letters";
import Thing
  from './thing';
const after = 1;
"#;

    assert_eq!(scan(code), vec!["./letters.js", "./thing.js"]);
}

#[test]
fn scanner_ignores_imports_in_comments_and_strings() {
    let code = r#"
// import commented from "./commented";
/*
import blocked from "./blocked";
*/
/* import inline from "./inline"; */ import real from "./real";
const text = "import quoted from './quoted'";
const template = `
import templated from "./templated";
`;
import last from "./last"; // import tail from "./tail";
"#;

    assert_eq!(scan(code), vec!["./real.js", "./last.js"]);
}

#[test]
fn scanner_skips_malformed_statements_and_keeps_going() {
    let code = r#"
import { broken from "./broken";
import from "./nothing";
const lazy = import("./dynamic");
import ok from "./ok";
"#;

    assert_eq!(scan(code), vec!["./ok.js"]);
}

#[test]
fn scanner_reads_files_and_reports_missing_ones_as_io_errors() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("app.js");
    fs::write(&file, "import lib from './lib';\n").unwrap();

    let scanner = JavaScriptScanner::new().unwrap();
    assert_eq!(scanner.extract_imports(&file).unwrap(), vec!["./lib.js"]);
    assert_eq!(scanner.language_name(), "javascript");

    let err = scanner
        .extract_imports(&dir.path().join("missing.js"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn semicolons_inside_specifiers_do_not_split_statements() {
    let code = r#"
import odd from "./a;b";
import { x } from './x'; import { y } from "./y;z";
"#;

    assert_eq!(scan(code), vec!["./a;b.js", "./x.js", "./y;z.js"]);
}

#[test]
fn scanner_finds_imports_after_other_statements_on_the_line() {
    let code = r#"
"use strict"; import first from './first';
setup(); export * from "./second"; run();
const s = "x;y"; import {
  third,
} from "./third";
"#;

    assert_eq!(
        scan(code),
        vec!["./first.js", "./second.js", "./third.js"]
    );
}
