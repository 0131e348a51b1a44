use schemars::schema_for;

#[allow(clippy::unwrap_used)]
fn main() {
    let schema = schema_for!(assetdesk_common::AssetdeskConfigStore);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
