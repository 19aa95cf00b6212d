//! Full batch runs over a scratch workspace: registry, contexts, adapters,
//! canonical output files and QC reports.

mod common;

use common::{data_lines, tsv, Workspace};
use owlnets::adapter::{AdapterError, EmitResult, GraphSink, SourceAdapter};
use owlnets::owlnets::RawEdge;
use owlnets::{BatchError, BatchOptions, BatchRunner, OwlnetsGraph, OwlnetsPaths, PipelineConfig};

const REGISTRY: &str = r#"{
    "HRAVS": {"edges_nodes_dir": "edges/HRAVS"},
    "GENCODE": {"execute": ["sh", "-c", "mkdir -p {sab_dir} && printf \"subject\\tpredicate\\tobject\\nREFSEQ NR_001234\\tRO:0002510\\tHGNC HGNC:1097\\n\" > {sab_dir}/OWLNETS_edgelist.txt"]},
    "UMLS": {"comment": "pre-built"},
    "BROKEN": {"execute": ["sh", "-c", "exit 3"]},
    "CUSTOM": {},
    "SCRIPTED": {"execute": ["sh", "-c", "mkdir -p {sab_dir} && echo \"build $*\" > {sab_dir}/args.txt && printf \"subject\\tpredicate\\tobject\\nSCRIPTED:1\\tisa\\tSCRIPTED:2\\n\" > {sab_dir}/OWLNETS_edgelist.txt", "step"]},
    "PATO": {"owl_url": "http://purl.obolibrary.org/obo/pato.owl"},
    "NCBI": {"owl_url": "http://purl.obolibrary.org/obo/ncbitaxon/subsets/taxslim.owl", "download_owl_url_to_file_name": "ncbi.owl"}
}"#;

const CONVERTER: &str = r#"owl_converter: ["sh", "-c", "mkdir -p {owlnets_dir}/{sab} && echo \"{owl_url} {owl_file}\" > {owlnets_dir}/{sab}/converted.txt && printf \"subject\\tpredicate\\tobject\\nhttp://purl.obolibrary.org/obo/{sab}_0000001\\tsubClassOf\\t{sab}_0000002\\n\" > {owlnets_dir}/{sab}/OWLNETS_edgelist.txt"]
"#;

const MERGE: &str = "merge_command: [\"sh\", \"-c\", \"echo {sab} >> {owlnets_dir}/merged.txt\"]\n";

fn workspace() -> Workspace {
    let ws = Workspace::new();
    ws.write("ontologies.json", REGISTRY);
    ws.write("contexts.yaml", "base: []\ncontexts:\n  hubmap: [HRAVS]\n");
    ws.write(
        "edges/HRAVS/edges.tsv",
        &tsv(
            &["subject", "predicate", "object"],
            &[
                &[
                    "HRAVS:0000001",
                    "http://www.w3.org/2000/01/rdf-schema#subClassOf",
                    "http://purl.obolibrary.org/obo/UBERON_0000948",
                ],
                &["HRAVS:0000001", "has part", "HRAVS:0000002"],
                &["HRAVS:0000002", "isa", ""],
            ],
        ),
    );
    ws.write(
        "edges/HRAVS/nodes.tsv",
        &tsv(
            &["node_id", "node_label", "node_synonyms", "node_dbxrefs"],
            &[
                &["HRAVS:0000001", "heart valve", "valve|cardiac valve", "UMLS:C0018826"],
                &["HRAVS:0000002", "leaflet", "", ""],
            ],
        ),
    );
    ws.write("edges/HRAVS/README", "not a table\n");
    ws.write(
        "owlnets_output/UMLS/OWLNETS_edgelist.txt",
        &tsv(&["subject", "predicate", "object"], &[&["C0018787", "isa", "C0018826"]]),
    );
    ws
}

fn runner(ws: &Workspace, extra: &str) -> BatchRunner {
    runner_with(ws, extra, BatchOptions::default())
}

fn runner_with(ws: &Workspace, extra: &str, options: BatchOptions) -> BatchRunner {
    let config = PipelineConfig::load(ws.config(extra)).unwrap();
    BatchRunner::from_config(config, options).unwrap()
}

#[test]
fn edges_nodes_source_is_written_canonically() {
    let ws = workspace();
    let outcomes = runner(&ws, "").run(&["hubmap"]).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].sab, "HRAVS");
    assert_eq!(outcomes[0].adapter, "edges-nodes");
    assert_eq!(outcomes[0].edges, 2);
    assert_eq!(outcomes[0].nodes, 2);
    assert_eq!(outcomes[0].relations, 2);
    assert_eq!(outcomes[0].rejections, 1);

    let edges = ws.read("owlnets_output/HRAVS/OWLNETS_edgelist.txt");
    assert_eq!(
        data_lines(&edges),
        vec!["HRAVS:0000001\tisa\tUBERON:0000948", "HRAVS:0000001\thas_part\tHRAVS:0000002"]
    );

    let nodes = ws.read("owlnets_output/HRAVS/OWLNETS_node_metadata.txt");
    assert!(nodes.starts_with("node_id\tnode_namespace\tnode_label"));
    assert!(nodes.contains("HRAVS:0000001\tHRAVS\theart valve\t\tvalve|cardiac valve\tUMLS:C0018826"));

    let relations = ws.read("owlnets_output/HRAVS/OWLNETS_relations.txt");
    assert!(relations.contains("has_part"));

    let report = ws.read("owlnets_output/HRAVS/ingest_report.txt");
    assert!(report.contains("SAB: HRAVS"));
    assert!(report.contains("REJECTED RECORDS (1)"));
    assert!(report.contains("empty endpoint"));
}

#[test]
fn execute_step_output_is_canonicalized_and_merged() {
    let ws = workspace();
    let outcomes = runner(&ws, MERGE).run(&["GENCODE", "UMLS"]).unwrap();
    assert_eq!(outcomes.iter().map(|o| o.sab.as_str()).collect::<Vec<_>>(), vec!["GENCODE", "UMLS"]);

    let edges = ws.read("owlnets_output/GENCODE/OWLNETS_edgelist.txt");
    assert_eq!(
        data_lines(&edges),
        vec!["REFSEQ:NR_001234\thttp://purl.obolibrary.org/obo/RO_0002510\tHGNC:1097"]
    );

    let umls = ws.read("owlnets_output/UMLS/OWLNETS_edgelist.txt");
    assert_eq!(data_lines(&umls), vec!["UMLS:C0018787\tisa\tUMLS:C0018826"]);

    let merged = ws.read("owlnets_output/merged.txt");
    assert_eq!(merged.lines().collect::<Vec<_>>(), vec!["GENCODE"]);
}

#[test]
fn skip_build_passes_flag_to_execute_step() {
    let ws = workspace();
    runner(&ws, "").run(&["SCRIPTED"]).unwrap();
    assert_eq!(ws.read("owlnets_output/SCRIPTED/args.txt").trim(), "build");

    let outcomes = runner_with(&ws, "", BatchOptions::default().with_skip_build(true))
        .run(&["SCRIPTED"])
        .unwrap();
    assert_eq!(ws.read("owlnets_output/SCRIPTED/args.txt").trim(), "build -s");
    assert_eq!(outcomes[0].edges, 1);
    assert_eq!(outcomes[0].relations, 1);
}

#[test]
fn owl_converter_runs_with_source_placeholders() {
    let ws = workspace();
    let outcomes = runner(&ws, CONVERTER).run(&["PATO", "NCBI"]).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.adapter == "owlnets-files"), "{outcomes:?}");

    assert_eq!(
        ws.read("owlnets_output/PATO/converted.txt").trim(),
        "http://purl.obolibrary.org/obo/pato.owl pato.owl"
    );
    assert_eq!(
        ws.read("owlnets_output/NCBI/converted.txt").trim(),
        "http://purl.obolibrary.org/obo/ncbitaxon/subsets/taxslim.owl ncbi.owl"
    );

    let edges = ws.read("owlnets_output/PATO/OWLNETS_edgelist.txt");
    assert_eq!(data_lines(&edges), vec!["PATO:0000001\tisa\tPATO:0000002"]);
}

#[test]
fn skip_build_reuses_existing_owl_output() {
    let ws = workspace();
    ws.write(
        "owlnets_output/PATO/OWLNETS_edgelist.txt",
        &tsv(&["subject", "predicate", "object"], &[&["PATO_0000003", "isa", "PATO_0000001"]]),
    );
    let outcomes = runner_with(&ws, CONVERTER, BatchOptions::default().with_skip_build(true))
        .run(&["PATO"])
        .unwrap();
    assert_eq!(outcomes[0].edges, 1);
    assert!(!ws.exists("owlnets_output/PATO/converted.txt"));

    let edges = ws.read("owlnets_output/PATO/OWLNETS_edgelist.txt");
    assert_eq!(data_lines(&edges), vec!["PATO:0000003\tisa\tPATO:0000001"]);
}

#[test]
fn written_files_read_back_as_a_graph() {
    let ws = workspace();
    runner(&ws, "").run(&["HRAVS"]).unwrap();

    let paths = OwlnetsPaths::new(ws.root().join("owlnets_output"), "HRAVS");
    let graph = OwlnetsGraph::read(&paths, "HRAVS").unwrap();
    assert_eq!(graph.edges().len(), 2);
    assert_eq!(graph.nodes().len(), 2);
    let findings = graph.validate();
    assert_eq!(findings.len(), 1, "{findings:?}");
}

#[test]
fn failing_step_aborts_the_batch() {
    let ws = workspace();
    let err = runner(&ws, "").run(&["BROKEN", "HRAVS"]).unwrap_err();
    match err {
        BatchError::StepFailed { sab, command, .. } => {
            assert_eq!(sab, "BROKEN");
            assert!(command.contains("exit 3"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!ws.exists("owlnets_output/HRAVS/OWLNETS_edgelist.txt"));
}

#[test]
fn unknown_source_fails_before_anything_runs() {
    let ws = workspace();
    let err = runner(&ws, "").run(&["HRAVS", "NOPE"]).unwrap_err();
    assert!(matches!(err, BatchError::Order(_)));
    assert!(!ws.exists("owlnets_output/HRAVS"));
}

struct FixedAdapter;

impl SourceAdapter for FixedAdapter {
    fn id(&self) -> &str {
        "fixed"
    }

    fn process(&self, sink: &mut GraphSink<'_>) -> Result<EmitResult, AdapterError> {
        let mut result = EmitResult::default();
        for (s, p, o) in [("CUSTOM 1", "part of", "CUSTOM 2"), ("CUSTOM 2", "RO:0002211", "C0018787")] {
            match sink.emit_edge(&RawEdge::new(s, p, o)) {
                Ok(()) => result.edges_committed += 1,
                Err(r) => result.rejections.push(r),
            }
        }
        Ok(result)
    }
}

#[test]
fn registered_adapter_replaces_build_step() {
    let ws = workspace();
    let outcomes = runner(&ws, "")
        .with_adapter("custom", Box::new(FixedAdapter))
        .run(&["CUSTOM"])
        .unwrap();
    assert_eq!(outcomes[0].adapter, "fixed");
    assert_eq!(outcomes[0].edges, 2);

    let edges = ws.read("owlnets_output/CUSTOM/OWLNETS_edgelist.txt");
    assert_eq!(
        data_lines(&edges),
        vec![
            "CUSTOM:1\tpart_of\tCUSTOM:2",
            "CUSTOM:2\thttp://purl.obolibrary.org/obo/RO_0002211\tUMLS:C0018787",
        ]
    );
}
