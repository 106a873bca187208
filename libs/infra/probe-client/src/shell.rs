// [libs/infra/probe-client/src/shell.rs]
//! =================================================================
//! APARATO: REMOTE SHELL EXECUTOR
//! RESPONSABILIDAD: EJECUCIÓN DE COMANDOS AUTENTICADOS EN HOSTS REMOTOS
//! =================================================================

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use netarchon_credentials::Credentials;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::instrument;

use crate::errors::ProbeError;

#[derive(Debug, Clone)]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[async_trait]
pub trait ShellExecutor: Send + Sync {
    async fn exec(
        &self,
        address: &str,
        credential: &Credentials,
        command: &str,
        timeout_budget: Duration,
    ) -> Result<ShellOutput, ProbeError>;
}

/// Invoca el binario `ssh` del sistema como subproceso, autenticando con
/// la clave privada del material de credenciales si está disponible o
/// confiando en un agente ssh ya autorizado en caso contrario. Cada
/// llamada es estrictamente no interactiva (`BatchMode=yes`).
pub struct SshShellExecutor;

impl SshShellExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SshShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShellExecutor for SshShellExecutor {
    #[instrument(skip(self, credential, command), fields(address = %address))]
    async fn exec(
        &self,
        address: &str,
        credential: &Credentials,
        command: &str,
        timeout_budget: Duration,
    ) -> Result<ShellOutput, ProbeError> {
        let mut invocation = Command::new("ssh");
        invocation
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg("StrictHostKeyChecking=accept-new")
            .arg("-o")
            .arg(format!("ConnectTimeout={}", timeout_budget.as_secs().max(1)));

        if let Some(private_key) = &credential.private_key {
            invocation.arg("-i").arg(private_key);
        }

        invocation
            .arg(format!("{}@{}", credential.username, address))
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = invocation.spawn().map_err(ProbeError::IoFault)?;

        let output = timeout(timeout_budget, child.wait_with_output())
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(ProbeError::IoFault)?;

        Ok(ShellOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}
