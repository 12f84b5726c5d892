use super::params::layout;
use common::{LayoutVariant, ParameterSet};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Record layout: a or b
    #[arg(long, default_value = "a", value_parser(layout))]
    layout: LayoutVariant,
}

impl Args {
    pub async fn run(self) -> anyhow::Result<()> {
        let params = ParameterSet::defaults(self.layout);
        println!("{}", serde_json::to_string_pretty(&params)?);
        Ok(())
    }
}
