//! Integration tests for the Splitter API
//!
//! Each test lays out a small module in a temporary directory and splits it.

use std::{fs, path::Path};

use tfsplit::{
    Kind, LayerSpec, Splitter, TfsplitError,
    config::{AppConfig, OutputConfig},
    export::EmitWarning,
};

const MAIN_TF: &str = r#"module "c" {
  source = "./modules/c"
  name   = "${var.prefix}-c"
}

resource "aws_instance" "a" {
  subnet_id = aws_subnet.b.id

  dynamic "ebs_block_device" {
    for_each = var.disks
    content {
      device_name = ebs_block_device.value
    }
  }
}

resource "aws_subnet" "b" {
  vpc_id = module.c.vpc_id
}
"#;

const VARIABLES_TF: &str = r#"variable "prefix" {
  type = string
}

variable "disks" {
  type    = list(string)
  default = []
}
"#;

const GRAPH: &str = r#"digraph {
	subgraph "root" {
		"[root] aws_instance.a (expand)" -> "[root] aws_subnet.b (expand)"
		"[root] aws_instance.a (expand)" -> "[root] var.disks"
		"[root] aws_instance.a (expand)" -> "[root] provider[\"registry.terraform.io/hashicorp/aws\"]"
		"[root] aws_subnet.b (expand)" -> "[root] module.c (expand)"
		"[root] aws_subnet.b (expand)" -> "[root] provider[\"registry.terraform.io/hashicorp/aws\"]"
		"[root] module.c (expand)" -> "[root] var.prefix"
		"[root] module.c.aws_vpc.this (expand)" -> "[root] module.c (expand)"
		"[root] provider[\"registry.terraform.io/hashicorp/aws\"] (close)" -> "[root] aws_instance.a (expand)"
	}
}
"#;

fn write_module(dir: &Path) {
    fs::write(dir.join("main.tf"), MAIN_TF).unwrap();
    fs::write(dir.join("variables.tf"), VARIABLES_TF).unwrap();
}

fn config(output: OutputConfig) -> AppConfig {
    AppConfig::new(
        vec![
            LayerSpec::new("core", "module.c"),
            LayerSpec::new("app", "aws_instance.a"),
        ],
        output,
    )
}

fn splitter() -> Splitter {
    Splitter::new(config(OutputConfig::default().with_terraform_block(false)))
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_split_core_and_app() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path());

    let report = splitter().split(dir.path(), GRAPH, None).unwrap();

    let core = report.layer("core").unwrap();
    let members: Vec<_> = core.closure().members().iter().map(|a| a.as_str()).collect();
    assert_eq!(members, ["var.prefix"]);

    let app = report.layer("app").unwrap();
    let members: Vec<_> = app.closure().members().iter().map(|a| a.as_str()).collect();
    assert_eq!(members, ["provider.aws", "resource.aws_subnet.b", "var.disks"]);

    let root = dir.path().join("tfsplit");
    assert_eq!(
        read(root.join("core/main.tf")),
        "module \"c\" {\n  source = \"./modules/c\"\n  name   = \"${var.prefix}-c\"\n}\n"
    );

    let app_main = read(root.join("app/main.tf"));
    let a = MAIN_TF.find("resource \"aws_instance\"").unwrap();
    let b = MAIN_TF.find("resource \"aws_subnet\"").unwrap();
    assert_eq!(app_main, format!("{}{}", &MAIN_TF[a..b], &MAIN_TF[b..]));
    assert!(!app_main.contains("module \"c\""));

    assert!(read(root.join("core/variables.tf")).contains("variable \"prefix\""));
    assert!(!read(root.join("app/variables.tf")).contains("prefix"));
}

#[test]
fn test_undeclared_provider_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path());

    let report = splitter().split(dir.path(), GRAPH, None).unwrap();
    let summary = report.layer("app").unwrap().outcome().summary().unwrap();

    assert!(matches!(
        summary.warnings(),
        [EmitWarning::UndeclaredProvider(address)] if address.as_str() == "provider.aws"
    ));
    assert_eq!(summary.count(Kind::Provider), 0);
    assert!(!dir.path().join("tfsplit/app/providers.tf").exists());
}

#[test]
fn test_second_run_skips_existing_layers() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path());

    splitter().split(dir.path(), GRAPH, None).unwrap();
    let core_main = dir.path().join("tfsplit/core/main.tf");
    fs::write(&core_main, "# edited by hand\n").unwrap();

    let report = splitter().split(dir.path(), GRAPH, None).unwrap();
    assert!(report.layers().iter().all(|layer| layer.outcome().is_skipped()));
    assert_eq!(read(&core_main), "# edited by hand\n");
}

#[test]
fn test_output_is_deterministic() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    write_module(first.path());
    write_module(second.path());

    let splitter = Splitter::new(config(OutputConfig::default()));
    splitter.split(first.path(), GRAPH, None).unwrap();
    splitter.split(second.path(), GRAPH, None).unwrap();

    for layer in ["core", "app"] {
        for file in ["main.tf", "variables.tf"] {
            let path = Path::new("tfsplit").join(layer).join(file);
            assert_eq!(
                read(first.path().join(&path)),
                read(second.path().join(&path))
            );
        }
    }
}

#[test]
fn test_layer_order_decides_ownership() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path());

    let config = AppConfig::new(
        vec![
            LayerSpec::new("app", "aws_instance.a"),
            LayerSpec::new("core", "module.c"),
        ],
        OutputConfig::default().with_terraform_block(false),
    );
    let report = Splitter::new(config).split(dir.path(), GRAPH, None).unwrap();

    assert!(report.layer("app").unwrap().closure().contains("module.c"));
    assert!(report.layer("core").unwrap().closure().members().is_empty());
    assert!(read(dir.path().join("tfsplit/app/main.tf")).contains("module \"c\""));
}

#[test]
fn test_missing_declaration_aborts() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.tf"), MAIN_TF).unwrap();

    let err = splitter().split(dir.path(), GRAPH, None).unwrap_err();
    match err {
        TfsplitError::MissingSource { layer, address } => {
            assert_eq!(layer, "core");
            assert_eq!(address.as_str(), "var.prefix");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join("tfsplit/core").exists());
}

#[test]
fn test_invalid_graph_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path());

    let err = splitter().split(dir.path(), "digraph {", None).unwrap_err();
    assert!(matches!(err, TfsplitError::Parse { .. }));
    assert!(!dir.path().join("tfsplit").exists());
}

#[test]
fn test_adjacent_files() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path());
    fs::write(
        dir.path().join("prod.tfvars"),
        "prefix = \"prod\"\ndisks = [\"sdb\"]\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("backend.hcl"),
        "bucket = \"tf-state\"\nkey = \"prod.tfstate\"\n",
    )
    .unwrap();
    let state = r#"{"values": {"root_module": {"resources": [
        {"address": "aws_instance.a", "mode": "managed", "values": {"id": "i-abc"}},
        {"address": "aws_subnet.b", "mode": "managed", "values": {"id": "subnet-1"}}
    ]}}}"#;

    let output = OutputConfig::default()
        .with_var_file("prod.tfvars")
        .with_backend_config("backend.hcl");
    let report = Splitter::new(config(output))
        .split(dir.path(), GRAPH, Some(state))
        .unwrap();

    let root = dir.path().join("tfsplit");
    assert_eq!(read(root.join("core/prod.tfvars")), "prefix = \"prod\"\n");
    assert_eq!(read(root.join("app/prod.tfvars")), "disks = [\"sdb\"]\n");
    assert_eq!(
        read(root.join("app/backend.hcl")),
        "bucket = \"tf-state\"\nkey = \"app/prod.tfstate\"\n"
    );
    assert!(!root.join("core/imports.tf").exists());
    assert_eq!(
        read(root.join("app/imports.tf")),
        "import {\n  to = aws_instance.a\n  id = \"i-abc\"\n}\n\n\
         import {\n  to = aws_subnet.b\n  id = \"subnet-1\"\n}\n"
    );

    let files = report.layer("app").unwrap().outcome().summary().unwrap().files();
    assert!(files.contains(&root.join("app/imports.tf")));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path());

    let err = Splitter::new(AppConfig::default())
        .split(dir.path(), GRAPH, None)
        .unwrap_err();
    assert!(matches!(err, TfsplitError::Config(_)));
}
