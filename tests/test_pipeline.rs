use phylosim::config::Parameters;
use phylosim::core::{
    BirthDeath, CharacterParameters, GrowthParameters, RandomStream, Seed, StopCriteria,
    add_characters, gen_tree, prune_extinct,
};
use phylosim::labels::LabelModel;
use phylosim::readwrite::{OutputFormat, TreeIO};
use phylosim::simulation::simulate_tree;

// --- GROWTH ---
#[test]
fn test_yule_example_is_reproducible() {
    let parameters = GrowthParameters::new(1., 0., StopCriteria::min_leaves(5));
    let first = gen_tree(&parameters, &mut RandomStream::from_seed("t1")).unwrap();
    for _ in 0..5 {
        let again = gen_tree(&parameters, &mut RandomStream::from_seed("t1")).unwrap();
        assert_eq!(again.tree, first.tree);
    }
    assert!(first.tree.num_leaves() >= 5);
    assert!(first.tree.extinct_leaves().is_empty());
}

#[test]
fn test_single_leaf_tree() {
    for (birth, death) in [(1., 0.), (1., 0.5), (0.2, 3.)] {
        let parameters = GrowthParameters::new(birth, death, StopCriteria::min_leaves(1));
        let growth = gen_tree(&parameters, &mut RandomStream::from_seed(1u64)).unwrap();
        assert_eq!(growth.tree.node_count(), 1);
        assert!(growth.tree.is_leaf(growth.tree.root()));
    }
}

#[test]
fn test_monotonic_extension() {
    for k in 2..8 {
        let mut stream = RandomStream::from_seed("extension");
        let mut process = BirthDeath::new(1., 0., 0.).unwrap();
        process
            .run_until(&StopCriteria::min_leaves(k), &mut stream)
            .unwrap();
        process
            .run_until(&StopCriteria::min_leaves(k + 1), &mut stream)
            .unwrap();

        let direct = gen_tree(
            &GrowthParameters::new(1., 0., StopCriteria::min_leaves(k + 1)),
            &mut RandomStream::from_seed("extension"),
        )
        .unwrap();
        assert!(process.tree().structurally_equal(&direct.tree));
    }
}

#[test]
fn test_prune_without_extinct_leaves() {
    let parameters = GrowthParameters::new(1., 0., StopCriteria::min_leaves(20));
    let mut tree = gen_tree(&parameters, &mut RandomStream::from_seed(3u64))
        .unwrap()
        .tree;
    let before = tree.clone();
    prune_extinct(&mut tree).unwrap();
    assert!(tree.structurally_equal(&before));
}

// --- CHARACTERS ---
#[test]
fn test_zero_characters_fail() {
    let parameters = GrowthParameters::new(1., 0., StopCriteria::min_leaves(5));
    let mut stream = RandomStream::from_seed("t1");
    let mut tree = gen_tree(&parameters, &mut stream).unwrap().tree;
    assert!(add_characters(&mut tree, &CharacterParameters::new(0, 5., 1.), &mut stream).is_err());
}

// --- FULL PIPELINE ---
#[test]
fn test_full_pipeline_outputs() {
    let parameters = Parameters {
        seed: Some(Seed::Text("t1".into())),
        death: Some(0.3),
        min_leaves: Some(8),
        num_chars: 10,
        k_hgt: Some(2.),
        labels: LabelModel::Bio,
        ..Default::default()
    };
    let simulation =
        simulate_tree(&parameters, &mut RandomStream::new(parameters.seed.as_ref())).unwrap();
    let tree = &simulation.tree;

    let newick = tree.render(OutputFormat::Newick).unwrap();
    assert!(newick.starts_with('('));
    assert!(newick.ends_with(';'));

    let nexus = tree.render(OutputFormat::Nexus).unwrap();
    assert!(nexus.starts_with("#NEXUS"));
    assert!(nexus.contains(&format!("ntax={}", tree.num_leaves())));

    let wordlist = tree.render(OutputFormat::Wordlist).unwrap();
    let rows = wordlist.lines().count();
    assert_eq!(rows, 1 + tree.num_leaves() * 10);

    let repeated =
        simulate_tree(&parameters, &mut RandomStream::new(parameters.seed.as_ref())).unwrap();
    assert_eq!(repeated.tree.render(OutputFormat::Newick).unwrap(), newick);
}
