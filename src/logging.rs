// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{anyhow, Error};
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "latency_report=info,latency_plot=info,latency_stats=info";

/// Logs to stderr, filtered by `RUST_LOG`. Stdout is left to the report output.
pub fn init() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_DIRECTIVES.into()),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("init logging: {err}"))
}
