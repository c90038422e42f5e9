use doe_core::DoeError;
use doe_space::{Parameter, ParameterDomain, SearchSpace};

fn discrete(name: &str) -> Parameter {
    Parameter::new(
        name,
        ParameterDomain::Discrete {
            levels: vec![1.0, 2.0, 3.0],
            tolerance: 0.2,
        },
    )
    .unwrap()
}

#[test]
fn empty_space_is_rejected() {
    let err = SearchSpace::new(Vec::new()).unwrap_err();
    assert_eq!(err.info().code, "space-empty");
}

#[test]
fn duplicate_parameter_names_are_rejected() {
    let err = SearchSpace::new(vec![discrete("x"), discrete("x")]).unwrap_err();
    assert!(matches!(err, DoeError::Space(_)));
    assert_eq!(err.info().code, "space-duplicate-parameter");
}

#[test]
fn invalid_domains_are_rejected_eagerly() {
    let empty_levels = Parameter::new(
        "x",
        ParameterDomain::Discrete {
            levels: Vec::new(),
            tolerance: 0.1,
        },
    );
    assert_eq!(empty_levels.unwrap_err().info().code, "space-empty-levels");

    let negative_tolerance = Parameter::new(
        "x",
        ParameterDomain::Discrete {
            levels: vec![1.0],
            tolerance: -0.5,
        },
    );
    assert_eq!(
        negative_tolerance.unwrap_err().info().code,
        "space-invalid-tolerance"
    );

    let inverted = Parameter::new(
        "x",
        ParameterDomain::Continuous {
            lower: 2.0,
            upper: 1.0,
        },
    );
    assert_eq!(inverted.unwrap_err().info().code, "space-inverted-bounds");

    let no_choices = Parameter::new(
        "x",
        ParameterDomain::Categorical {
            choices: Vec::new(),
        },
    );
    assert_eq!(no_choices.unwrap_err().info().code, "space-empty-choices");
}

#[test]
fn lookup_and_names_preserve_order() {
    let space = SearchSpace::new(vec![discrete("b"), discrete("a")]).unwrap();
    assert_eq!(space.parameter_names(), vec!["b".to_string(), "a".to_string()]);
    assert!(space.parameter("a").is_some());
    assert!(space.parameter("c").is_none());
}

#[test]
fn space_json_roundtrip() {
    let space = SearchSpace::new(vec![
        discrete("x"),
        Parameter::new(
            "solvent",
            ParameterDomain::Categorical {
                choices: vec!["water".into(), "ethanol".into()],
            },
        )
        .unwrap(),
    ])
    .unwrap();
    let json = serde_json::to_string(&space).unwrap();
    let restored: SearchSpace = serde_json::from_str(&json).unwrap();
    assert_eq!(space, restored);
}

#[test]
fn canonical_hash_tracks_content() {
    let space = SearchSpace::new(vec![discrete("x"), discrete("y")]).unwrap();
    let same = SearchSpace::new(vec![discrete("x"), discrete("y")]).unwrap();
    let reordered = SearchSpace::new(vec![discrete("y"), discrete("x")]).unwrap();
    assert_eq!(
        space.canonical_hash().unwrap(),
        same.canonical_hash().unwrap()
    );
    assert_ne!(
        space.canonical_hash().unwrap(),
        reordered.canonical_hash().unwrap()
    );
}
