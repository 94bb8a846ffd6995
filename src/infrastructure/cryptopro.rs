use crate::config::CryptoProConfig;
use crate::domain::certificate::{Certificate, Container, normalize_serial};
use crate::domain::ports::Signer;
use crate::error::SignerError;
use crate::infrastructure::process::{CommandOutput, CommandRunner, TokioCommandRunner};
use crate::interfaces::console::{read_certificates, read_containers, read_error};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, warn};

const CSPTEST: &str = "csptest";
const CERTMGR: &str = "certmgr";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform {
    Hash,
    Sign,
}

impl Transform {
    fn output_name(self) -> &'static str {
        match self {
            Self::Hash => "content.hash",
            Self::Sign => "content.sign",
        }
    }
}

/// Signer backed by the CryptoPro CSP command line utilities.
///
/// Every hash and sign call works in its own freshly created temporary
/// directory, which is removed on every exit path.
pub struct CryptoProSigner<R: CommandRunner = TokioCommandRunner> {
    config: CryptoProConfig,
    runner: R,
}

impl CryptoProSigner {
    pub fn new(config: CryptoProConfig) -> Self {
        Self::with_runner(config, TokioCommandRunner)
    }
}

impl<R: CommandRunner> CryptoProSigner<R> {
    pub fn with_runner(config: CryptoProConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &CryptoProConfig {
        &self.config
    }

    /// Hashes `content` with the configured algorithm.
    pub async fn hash(&self, content: &[u8]) -> Result<Vec<u8>, SignerError> {
        self.transform(Transform::Hash, content).await
    }

    /// Signs `content` with the key in the configured container.
    pub async fn sign(&self, content: &[u8]) -> Result<Vec<u8>, SignerError> {
        self.transform(Transform::Sign, content).await
    }

    /// Lists the key containers visible to the provider.
    pub async fn list_containers(&self) -> Result<Vec<Container>, SignerError> {
        let args = ["-keyset", "-enum_cont", "-fqcn", "-verifyc", "-uniq"]
            .map(String::from)
            .to_vec();
        let output = self.execute_checked(CSPTEST, args).await?;
        Ok(read_containers(&output.stdout_text()))
    }

    /// Lists the certificates installed in the configured store.
    pub async fn list_certificates(&self) -> Result<Vec<Certificate>, SignerError> {
        if self.config.store_name.is_empty() {
            return Err(SignerError::Configuration(
                "store name must be defined".to_string(),
            ));
        }
        let args = vec![
            "-list".to_string(),
            "-store".to_string(),
            self.config.store_name.clone(),
        ];
        let output = self.execute_checked(CERTMGR, args).await?;
        Ok(read_certificates(&output.stdout_text()))
    }

    /// Finds the serial of the certificate bound to the configured container.
    pub async fn certificate_serial(&self) -> Result<Option<String>, SignerError> {
        let containers = self.list_containers().await?;
        let Some(container) = containers
            .into_iter()
            .find(|container| container.name == self.config.container_name)
        else {
            debug!(container = %self.config.container_name, "container not found");
            return Ok(None);
        };

        let certificates = self.list_certificates().await?;
        let serial = certificates
            .iter()
            .find(|certificate| certificate.container() == Some(container.id.as_str()))
            .and_then(Certificate::serial)
            .map(normalize_serial);

        if serial.is_none() {
            debug!(container = %container.id, "no certificate bound to container");
        }
        Ok(serial)
    }

    async fn transform(&self, transform: Transform, content: &[u8]) -> Result<Vec<u8>, SignerError> {
        self.require_key_settings()?;

        let workdir = tempfile::Builder::new().prefix("cryptopro-").tempdir()?;
        let input = workdir.path().join("content");
        let output = workdir.path().join(transform.output_name());
        tokio::fs::write(&input, content).await?;

        let args = self.transform_args(transform, &input, &output);
        self.execute_checked(CSPTEST, args).await?;

        let result = tokio::fs::read(&output).await?;
        workdir.close()?;
        Ok(result)
    }

    fn transform_args(&self, transform: Transform, input: &Path, output: &Path) -> Vec<String> {
        let (mode, output_flag) = match transform {
            Transform::Hash => ("-hash", "-hashout"),
            Transform::Sign => ("-sign", "-out"),
        };
        vec![
            "-keyset".to_string(),
            mode.to_string(),
            self.config.sign_algorithm.clone(),
            "-silent".to_string(),
            "-cont".to_string(),
            self.config.container_name.clone(),
            "-keytype".to_string(),
            "exchange".to_string(),
            "-in".to_string(),
            input.to_string_lossy().into_owned(),
            output_flag.to_string(),
            output.to_string_lossy().into_owned(),
            "-provtype".to_string(),
            self.config.provider_type.to_string(),
        ]
    }

    fn require_key_settings(&self) -> Result<(), SignerError> {
        if self.config.container_name.is_empty() {
            return Err(SignerError::Configuration(
                "container name must be defined".to_string(),
            ));
        }
        if self.config.sign_algorithm.is_empty() {
            return Err(SignerError::Configuration(
                "sign algorithm must be defined".to_string(),
            ));
        }
        Ok(())
    }

    async fn execute_checked(&self, program: &str, args: Vec<String>) -> Result<CommandOutput, SignerError> {
        let program = self.config.bin_dir.join(program);
        debug!(program = %program.display(), ?args, "executing toolkit command");

        let output = self.runner.run(&program, &args).await?;
        if output.success() {
            return Ok(output);
        }

        warn!(
            program = %program.display(),
            exit_code = ?output.exit_code,
            "toolkit command failed"
        );
        Err(read_error(&output.stderr_text()))
    }
}

#[async_trait]
impl<R: CommandRunner> Signer for CryptoProSigner<R> {
    async fn hash(&self, content: &[u8]) -> Result<Vec<u8>, SignerError> {
        CryptoProSigner::hash(self, content).await
    }

    async fn sign(&self, content: &[u8]) -> Result<Vec<u8>, SignerError> {
        CryptoProSigner::sign(self, content).await
    }

    async fn certificate_serial(&self) -> Result<Option<String>, SignerError> {
        CryptoProSigner::certificate_serial(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::path::PathBuf;
    use std::sync::Mutex;

    const CONTAINER: &str = r"\\.\HDIMAGE\xx-xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx";

    #[derive(Debug, Clone)]
    struct Call {
        program: String,
        args: Vec<String>,
        input: Option<Vec<u8>>,
    }

    /// Answers each program with a canned output and writes `artifact` to
    /// whatever path follows `-hashout`/`-out`.
    #[derive(Default)]
    struct ScriptedRunner {
        outputs: HashMap<&'static str, CommandOutput>,
        artifact: Vec<u8>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedRunner {
        fn answering(mut self, program: &'static str, output: CommandOutput) -> Self {
            self.outputs.insert(program, output);
            self
        }

        fn writing(mut self, artifact: &[u8]) -> Self {
            self.artifact = artifact.to_vec();
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn flag_value(args: &[String], flag: &str) -> Option<PathBuf> {
        args.iter()
            .position(|arg| arg == flag)
            .and_then(|i| args.get(i + 1))
            .map(PathBuf::from)
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, program: &Path, args: &[String]) -> io::Result<CommandOutput> {
            let name = program.file_name().unwrap().to_string_lossy().into_owned();
            let output = self.outputs.get(name.as_str()).cloned().unwrap_or_default();

            let input = flag_value(args, "-in").map(|path| std::fs::read(path).unwrap());
            if output.success()
                && let Some(out) = flag_value(args, "-hashout").or_else(|| flag_value(args, "-out"))
            {
                std::fs::write(out, &self.artifact)?;
            }

            self.calls.lock().unwrap().push(Call {
                program: program.to_string_lossy().into_owned(),
                args: args.to_vec(),
                input,
            });
            Ok(output)
        }
    }

    fn ok(stdout: &str) -> CommandOutput {
        CommandOutput {
            exit_code: Some(0),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }

    fn failed(stderr: &str) -> CommandOutput {
        CommandOutput {
            exit_code: Some(1),
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    fn config() -> CryptoProConfig {
        CryptoProConfig::new(CONTAINER, "uMy").with_bin_dir("/opt/cprocsp/bin/amd64")
    }

    fn temp_paths(call: &Call) -> Vec<PathBuf> {
        ["-in", "-hashout", "-out"]
            .iter()
            .filter_map(|flag| flag_value(&call.args, flag))
            .collect()
    }

    #[tokio::test]
    async fn test_hash_returns_output_and_removes_temp_files() {
        let runner = ScriptedRunner::default()
            .answering(CSPTEST, ok(""))
            .writing(b"test result");
        let signer = CryptoProSigner::with_runner(config(), runner);

        let digest = signer.hash(b"test source").await.unwrap();
        assert_eq!(digest, b"test result");

        let calls = signer.runner.calls();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.program, "/opt/cprocsp/bin/amd64/csptest");
        assert_eq!(call.input.as_deref(), Some(&b"test source"[..]));
        assert_eq!(&call.args[..6], &[
            "-keyset", "-hash", "GOST12_256", "-silent", "-cont", CONTAINER
        ]);
        assert!(call.args.windows(2).any(|w| w == ["-keytype", "exchange"]));
        assert!(call.args.windows(2).any(|w| w == ["-provtype", "80"]));

        let paths = temp_paths(call);
        assert_eq!(paths.len(), 2);
        for path in &paths {
            assert!(!path.exists(), "{} was not removed", path.display());
        }
        assert!(!paths[0].parent().unwrap().exists());
    }

    #[tokio::test]
    async fn test_sign_uses_sign_template() {
        let runner = ScriptedRunner::default()
            .answering(CSPTEST, ok(""))
            .writing(b"signature");
        let signer = CryptoProSigner::with_runner(config(), runner);

        let signature = signer.sign(b"digest").await.unwrap();
        assert_eq!(signature, b"signature");

        let call = &signer.runner.calls()[0];
        assert_eq!(call.args[1], "-sign");
        assert!(flag_value(&call.args, "-out").is_some());
        assert!(flag_value(&call.args, "-hashout").is_none());
        for path in temp_paths(call) {
            assert!(!path.exists());
        }
    }

    #[tokio::test]
    async fn test_toolkit_failure_is_coded_and_cleans_up() {
        let runner = ScriptedRunner::default().answering(
            CSPTEST,
            failed("An error occurred in running the program.\nError number 0x7b (123).\nSome error\n"),
        );
        let signer = CryptoProSigner::with_runner(config(), runner);

        let error = signer.hash(b"test source").await.unwrap_err();
        match error {
            SignerError::Toolkit { code, text } => {
                assert_eq!(code, 123);
                assert_eq!(text, "Some error");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        for path in temp_paths(&signer.runner.calls()[0]) {
            assert!(!path.exists());
        }
    }

    #[tokio::test]
    async fn test_missing_container_name_is_rejected_before_running() {
        let signer = CryptoProSigner::with_runner(
            CryptoProConfig::new("", "uMy"),
            ScriptedRunner::default(),
        );

        let error = signer.sign(b"content").await.unwrap_err();
        assert!(matches!(error, SignerError::Configuration(_)));
        assert!(signer.runner.calls().is_empty());
    }

    const CONTAINERS: &str = concat!(
        "AcquireContext: OK. HCRYPTPROV: 12345678\n",
        r"\\.\HDIMAGE\xx-xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx|\\.\HDIMAGE\HDIMAGE\\xx-xxxxf.000\XXXX",
        "\n",
        r"\\.\HDIMAGE\yy-yyyyyyyy-yyyy-yyyy-yyyy-yyyyyyyyyyyy|\\.\HDIMAGE\HDIMAGE\\yy-yyyyf.000\YYYY",
        "\n[ErrorCode: 0x00000000]\n",
    );

    const CERTIFICATES: &str = concat!(
        "=====================\n",
        "1-------\n",
        "Serial              : 0x7C0000FFAB\n",
        r"Container           : HDIMAGE\\yy-yyyyf.000\YYYY",
        "\n=====================\n",
        "2-------\n",
        "Serial              : 0x120032ABCD\n",
        r"Container           : HDIMAGE\\xx-xxxxf.000\XXXX",
        "\n=====================\n",
    );

    #[tokio::test]
    async fn test_certificate_serial_cross_references_container() {
        let runner = ScriptedRunner::default()
            .answering(CSPTEST, ok(CONTAINERS))
            .answering(CERTMGR, ok(CERTIFICATES));
        let signer = CryptoProSigner::with_runner(config(), runner);

        let serial = signer.certificate_serial().await.unwrap();
        assert_eq!(serial.as_deref(), Some("120032abcd"));

        let calls = signer.runner.calls();
        assert_eq!(calls[1].args, vec!["-list", "-store", "uMy"]);
    }

    #[tokio::test]
    async fn test_certificate_serial_misses() {
        let unknown = CryptoProConfig::new(r"\\.\HDIMAGE\unknown", "uMy");
        let runner = ScriptedRunner::default()
            .answering(CSPTEST, ok(CONTAINERS))
            .answering(CERTMGR, ok(CERTIFICATES));
        let signer = CryptoProSigner::with_runner(unknown, runner);
        assert_eq!(signer.certificate_serial().await.unwrap(), None);
        // The store is not queried once the container lookup misses.
        assert_eq!(signer.runner.calls().len(), 1);

        let runner = ScriptedRunner::default()
            .answering(CSPTEST, ok(CONTAINERS))
            .answering(CERTMGR, ok("=====\n"));
        let signer = CryptoProSigner::with_runner(config(), runner);
        assert_eq!(signer.certificate_serial().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_containers_failure_is_coded() {
        let runner = ScriptedRunner::default().answering(CSPTEST, failed("Error number 0x1 (1).\nNo reader\n"));
        let signer = CryptoProSigner::with_runner(config(), runner);

        let error = signer.list_containers().await.unwrap_err();
        assert_eq!(error.code(), 1);
    }
}
