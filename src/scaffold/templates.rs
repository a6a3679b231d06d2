use super::{ConfigFormat, Framework};
use crate::unit::UnitConfig;
use anyhow::{Context, Result};

pub const SERVER_FILE: &str = "server.py";

const FLASK_SERVER: &str = r#""""__NAME__ MCP server."""
import argparse
import os

from flask import Flask, jsonify

app = Flask(__name__)


@app.route("/health")
def health():
    return jsonify({"status": "ok", "server": "__NAME__"})


def main():
    parser = argparse.ArgumentParser(description="__NAME__ MCP server")
    parser.add_argument("--port", type=int, default=int(os.environ.get("PORT", __PORT__)))
    parser.add_argument("--config", default=os.environ.get("MCP_CONFIG"))
    args = parser.parse_args()

    app.config["MCP_CONFIG"] = args.config
    app.run(host="0.0.0.0", port=args.port)


if __name__ == "__main__":
    main()
"#;

const FASTAPI_SERVER: &str = r#""""__NAME__ MCP server."""
import argparse
import os

import uvicorn
from fastapi import FastAPI

app = FastAPI(title="__NAME__")


@app.get("/health")
async def health():
    return {"status": "ok", "server": "__NAME__"}


def main():
    parser = argparse.ArgumentParser(description="__NAME__ MCP server")
    parser.add_argument("--port", type=int, default=int(os.environ.get("PORT", __PORT__)))
    parser.add_argument("--config", default=os.environ.get("MCP_CONFIG"))
    args = parser.parse_args()

    app.state.mcp_config = args.config
    uvicorn.run(app, host="0.0.0.0", port=args.port)


if __name__ == "__main__":
    main()
"#;

pub fn requirements(framework: Framework) -> &'static str {
    match framework {
        Framework::Flask => "flask>=3.0\n",
        Framework::FastApi => "fastapi>=0.110\nuvicorn>=0.29\n",
    }
}

pub fn server(framework: Framework, name: &str, port: u16) -> String {
    let template = match framework {
        Framework::Flask => FLASK_SERVER,
        Framework::FastApi => FASTAPI_SERVER,
    };
    template
        .replace("__NAME__", name)
        .replace("__PORT__", &port.to_string())
}

/// File name and contents of the unit configuration
pub fn config(format: ConfigFormat, port: u16) -> Result<(&'static str, String)> {
    let config = UnitConfig::new(port);
    match format {
        ConfigFormat::Json => {
            let mut content =
                serde_json::to_string_pretty(&config).context("Failed to encode config.json")?;
            content.push('\n');
            Ok(("config.json", content))
        }
        ConfigFormat::Yaml => Ok(("config.yaml", config.to_flow_yaml())),
    }
}
