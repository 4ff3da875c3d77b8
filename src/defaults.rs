//! Built-in license catalog.
//!
//! The families and header patterns the auditor recognizes with zero
//! configuration. Each license matches on its canonical header sentence or
//! its SPDX tag. GPL variants are recognized but not in the default
//! approved set; use `approve` or a catalog source to change that.

use license::{CatalogDef, FamilyDef, LicenseDef};
use matcher::MatcherSpec;

const APACHE_TEXT: &str = "Licensed under the Apache License, Version 2.0";

const MIT_TEXT: &str = "Permission is hereby granted, free of charge, to any person obtaining \
                        a copy of this software and associated documentation files";

const BSD3_TEXT: &str = "Redistribution and use in source and binary forms, with or without \
                         modification, are permitted provided that the following conditions \
                         are met";

const CDDL_TEXT: &str = "The contents of this file are subject to the terms of the Common \
                         Development and Distribution License";

const GPL1_TEXT: &str = "This program is free software; you can redistribute it and/or modify \
                         it under the terms of the GNU General Public License as published by \
                         the Free Software Foundation; either version 1, or (at your option) \
                         any later version";

const GPL2_TEXT: &str = "This program is free software; you can redistribute it and/or modify \
                         it under the terms of the GNU General Public License as published by \
                         the Free Software Foundation; either version 2 of the License, or (at \
                         your option) any later version";

const GPL3_TEXT: &str = "This program is free software: you can redistribute it and/or modify \
                         it under the terms of the GNU General Public License as published by \
                         the Free Software Foundation, either version 3 of the License, or (at \
                         your option) any later version";

const OASIS_CLAUSE: &str = "This document and translations of it may be copied and furnished \
                            to others and derivative works that comment on or otherwise \
                            explain it or assist in its implementation may be prepared copied \
                            published and distributed";

const W3C_SOFTWARE_URL: &str = "http://www.w3.org/Consortium/Legal/copyright-software-19980720";
const W3C_DOCUMENT_URL: &str = "http://www.w3.org/Consortium/Legal/copyright-documents-19990405";

fn family(category: &str, name: &str) -> FamilyDef {
    FamilyDef {
        category: category.to_string(),
        name: name.to_string(),
    }
}

fn text_or_spdx(text: &str, tag: &str) -> MatcherSpec {
    MatcherSpec::or(vec![MatcherSpec::text(text), MatcherSpec::spdx(tag)])
}

/// The catalog used when `use_default_catalog` is on.
pub fn default_catalog() -> CatalogDef {
    let families = vec![
        family("AL", "Apache License Version 2.0"),
        family("MIT", "The MIT License"),
        family("BSD-3", "BSD 3 clause"),
        family("CDDL1", "COMMON DEVELOPMENT AND DISTRIBUTION LICENSE Version 1.0"),
        family("GPL1", "GNU General Public License, version 1"),
        family("GPL2", "GNU General Public License, version 2"),
        family("GPL3", "GNU General Public License, version 3"),
        family("OASIS", "OASIS Open License"),
        family("W3C", "W3C Software Copyright"),
        family("W3CD", "W3C Document Copyright"),
    ];

    let licenses = vec![
        LicenseDef::new("Apache-2.0", "AL", text_or_spdx(APACHE_TEXT, "Apache-2.0")),
        LicenseDef::new("MIT", "MIT", text_or_spdx(MIT_TEXT, "MIT")),
        LicenseDef::new("BSD-3-Clause", "BSD-3", text_or_spdx(BSD3_TEXT, "BSD-3-Clause")),
        LicenseDef::new("CDDL-1.0", "CDDL1", text_or_spdx(CDDL_TEXT, "CDDL-1.0")),
        LicenseDef::new("GPL-1.0", "GPL1", text_or_spdx(GPL1_TEXT, "GPL-1.0-only")),
        LicenseDef::new("GPL-2.0", "GPL2", text_or_spdx(GPL2_TEXT, "GPL-2.0-only")),
        LicenseDef::new("GPL-3.0", "GPL3", text_or_spdx(GPL3_TEXT, "GPL-3.0-only")),
        // The OASIS header has no SPDX tag; it is the copyright statement
        // naming OASIS Open plus the derivative-works clause.
        LicenseDef::new(
            "OASIS",
            "OASIS",
            MatcherSpec::and(vec![
                MatcherSpec::copyright(None, None, None),
                MatcherSpec::phrases(["OASIS Open"]),
                MatcherSpec::text(OASIS_CLAUSE),
            ]),
        ),
        LicenseDef::new("W3C", "W3C", text_or_spdx(W3C_SOFTWARE_URL, "W3C")),
        LicenseDef::new("W3C-doc", "W3CD", MatcherSpec::text(W3C_DOCUMENT_URL)),
    ];

    let approved = ["AL", "MIT", "BSD-3", "CDDL1", "OASIS", "W3C", "W3CD"]
        .into_iter()
        .map(str::to_string)
        .collect();

    CatalogDef {
        families,
        matchers: Vec::new(),
        licenses,
        approved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use license::{ApprovalFilter, Registry, RegistryBuilder};
    use scan::{MemoryDocument, OutcomeKind, Scanner};

    fn registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        builder.add_catalog(default_catalog());
        builder.build().unwrap()
    }

    #[test]
    fn default_catalog_builds_a_registry() {
        let registry = registry();
        assert_eq!(registry.licenses().len(), 10);
        assert_eq!(
            registry.license("MIT").unwrap().family().name(),
            "The MIT License"
        );
    }

    #[test]
    fn apache_header_text_is_approved() {
        let registry = registry();
        let scanner = Scanner::new(&registry, ApprovalFilter::Approved, &[], &[]);
        let mut doc = MemoryDocument::new(
            "src/lib.rs",
            "// Licensed under the Apache License, Version 2.0 (the \"License\");\n",
        );
        let claim = scanner.scan(&mut doc);
        assert_eq!(claim.kind(), OutcomeKind::Approved);
        assert_eq!(claim.license_id(), Some("Apache-2.0"));
    }

    #[test]
    fn gpl_is_recognized_but_not_approved() {
        let registry = registry();
        let scanner = Scanner::new(&registry, ApprovalFilter::All, &[], &[]);
        let mut doc = MemoryDocument::new(
            "daemon.c",
            "/* This program is free software; you can redistribute it and/or modify\n \
             * it under the terms of the GNU General Public License as published by\n \
             * the Free Software Foundation; either version 2 of the License, or (at\n \
             * your option) any later version.\n */\n",
        );
        let claim = scanner.scan(&mut doc);
        assert_eq!(claim.kind(), OutcomeKind::Unapproved);
        assert_eq!(claim.family().unwrap().category().trimmed(), "GPL2");
    }

    #[test]
    fn oasis_needs_both_copyright_and_clause() {
        let registry = registry();
        let scanner = Scanner::new(&registry, ApprovalFilter::Approved, &[], &[]);

        let mut partial = MemoryDocument::new(
            "spec.txt",
            "Copyright 2004 OASIS Open\nAll rights reserved.\n",
        );
        assert_eq!(scanner.scan(&mut partial).kind(), OutcomeKind::Unknown);

        let mut full = MemoryDocument::new(
            "spec.txt",
            "Copyright 2004 OASIS Open\n\
             This document and translations of it may be copied and furnished to\n\
             others and derivative works that comment on or otherwise explain it\n\
             or assist in its implementation may be prepared copied published\n\
             and distributed\n",
        );
        let claim = scanner.scan(&mut full);
        assert_eq!(claim.kind(), OutcomeKind::Approved);
        assert_eq!(claim.family().unwrap().category().trimmed(), "OASIS");
    }

    #[test]
    fn w3c_document_license_matches_by_url() {
        let registry = registry();
        let scanner = Scanner::new(&registry, ApprovalFilter::Approved, &[], &[]);
        let mut doc = MemoryDocument::new(
            "index.html",
            "<!-- http://www.w3.org/Consortium/Legal/copyright-documents-19990405 -->\n",
        );
        let claim = scanner.scan(&mut doc);
        assert_eq!(claim.kind(), OutcomeKind::Approved);
        assert_eq!(claim.family().unwrap().category().trimmed(), "W3CD");
    }
}
