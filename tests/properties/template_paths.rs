//! Property tests for template path handling.

use proptest::prelude::*;
use std::path::Path;

use jinja_watch::paths::{has_template_suffix, TemplatePath, ERROR_LOG_SUFFIX};

fn segments() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[A-Za-z0-9_-]{1,8}", 0..4)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: A template below the root is identified by its `/`-joined relative path.
    #[test]
    fn property_relative_identity(dirs in segments(), stem in "[A-Za-z0-9_-]{1,8}") {
        let root = Path::new("/watch/root");
        let mut relative = dirs.clone();
        relative.push(format!("{stem}.yaml.jinja"));

        let absolute = relative.iter().fold(root.to_path_buf(), |acc, p| acc.join(p));
        let template = TemplatePath::from_absolute(root, &absolute);

        prop_assert_eq!(template.clone().map(|t| t.as_str().to_string()), Some(relative.join("/")));
        let template = template.unwrap();
        prop_assert_eq!(template.source_path(root), absolute);
    }

    /// PROPERTY: Output and error files sit beside the source and never collide with it.
    #[test]
    fn property_artifact_locations(dirs in segments(), stem in "[A-Za-z0-9_-]{1,8}") {
        let root = Path::new("/watch/root");
        let mut relative = dirs;
        relative.push(format!("{stem}.yaml.jinja"));
        let template = TemplatePath::new(relative.join("/"));

        let source = template.source_path(root);
        let output = template.output_path(root);
        let errors = template.error_path(root);

        prop_assert_eq!(output.parent(), source.parent());
        prop_assert_eq!(errors.parent(), source.parent());
        prop_assert_eq!(output.file_name().unwrap().to_str().unwrap(), format!("{stem}.yaml"));
        prop_assert_eq!(
            errors.file_name().unwrap().to_str().unwrap(),
            format!("{stem}.yaml.jinja{ERROR_LOG_SUFFIX}")
        );
        prop_assert!(!has_template_suffix(&output));
        prop_assert!(!has_template_suffix(&errors));
    }

    /// PROPERTY: Paths without the suffix are never templates.
    #[test]
    fn property_suffix_required(name in "[A-Za-z0-9_.-]{1,16}") {
        prop_assume!(!name.ends_with(".yaml.jinja"));
        let root = Path::new("/watch/root");
        prop_assert!(TemplatePath::from_absolute(root, &root.join(&name)).is_none());
    }

    /// PROPERTY: Matching is case-sensitive.
    #[test]
    fn property_case_sensitive(stem in "[a-z]{1,8}") {
        let lower = TemplatePath::new(format!("{stem}.yaml.jinja"));
        let upper = TemplatePath::new(format!("{}.yaml.jinja", stem.to_uppercase()));
        prop_assert_ne!(lower, upper);
    }
}
