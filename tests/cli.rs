//! CLI integration tests: exercise the binary end to end against real
//! contract files and check exit codes per error class.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn contractgen() -> Command {
    Command::cargo_bin("contractgen").unwrap()
}

const PETSTORE: &str = r##"openapi: 3.0.3
info:
  title: Pet Store
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
      tags:
        - pets
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Pet"
components:
  schemas:
    Pet:
      type: object
      required:
        - name
      properties:
        name:
          type: string
"##;

fn write_contract(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("contract.yaml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn generate_model_only_writes_model_sources() {
    let dir = TempDir::new().unwrap();
    let contract = write_contract(&dir, PETSTORE);
    let out = dir.path().join("generated");

    contractgen()
        .arg("generate")
        .arg("--input")
        .arg(&contract)
        .arg("--generator")
        .arg("model-only")
        .arg("--base-package")
        .arg("com.example")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file(s)"));

    let model = out.join("com/example/model/Pet.java");
    let source = std::fs::read_to_string(model).unwrap();
    assert!(source.contains("public class Pet"));
    assert!(source.contains("@NotNull"));
}

#[test]
fn validate_reports_operation_and_model_counts() {
    let dir = TempDir::new().unwrap();
    let contract = write_contract(&dir, PETSTORE);

    contractgen()
        .arg("validate")
        .arg("--input")
        .arg(&contract)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 operation(s), 1 model(s)"));
}

#[test]
fn missing_input_file_exits_with_io_code() {
    contractgen()
        .arg("validate")
        .arg("--input")
        .arg("no-such-contract.yaml")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn malformed_contract_exits_with_parse_code() {
    let dir = TempDir::new().unwrap();
    let contract = write_contract(&dir, "openapi: 3.0.3\ninfo: {title: t, version: 1}\npaths:\n  pets: {}\n");

    contractgen()
        .arg("validate")
        .arg("--input")
        .arg(&contract)
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("pets"));
}

#[test]
fn unsupported_construct_exits_without_partial_output() {
    let dir = TempDir::new().unwrap();
    let contract = write_contract(
        &dir,
        r##"openapi: 3.0.3
info:
  title: t
  version: 1.0.0
paths:
  /things:
    get:
      operationId: getThing
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                oneOf:
                  - type: string
                  - type: integer
"##,
    );
    let out = dir.path().join("generated");

    contractgen()
        .arg("generate")
        .arg("--input")
        .arg(&contract)
        .arg("--generator")
        .arg("model-only")
        .arg("--base-package")
        .arg("com.example")
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("oneOf"));

    assert!(!out.exists());
}

#[test]
fn incompatible_variant_exits_with_configuration_code() {
    let dir = TempDir::new().unwrap();
    let contract = write_contract(&dir, PETSTORE);

    contractgen()
        .arg("generate")
        .arg("--input")
        .arg(&contract)
        .arg("--generator")
        .arg("server")
        .arg("--variant")
        .arg("spring")
        .arg("--model-variant")
        .arg("gson")
        .arg("--base-package")
        .arg("com.example")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("gson"));
}
