//! Target CPU architecture for Windows packages.

/// CPU architecture of the Windows package.
///
/// Selects the MSBuild platform and the `ProcessorArchitecture` of the MSIX
/// identity.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Arch {
    /// x86_64 / AMD64 (64-bit)
    #[default]
    #[value(name = "x64")]
    X86_64,
    /// x86 / i686 (32-bit)
    #[value(name = "x86")]
    X86,
    /// AArch64 / ARM64 (64-bit)
    #[value(name = "arm64")]
    AArch64,
}

impl Arch {
    /// MSBuild `/p:Platform` value.
    pub fn msbuild_platform(self) -> &'static str {
        match self {
            Arch::X86_64 => "x64",
            Arch::X86 => "x86",
            Arch::AArch64 => "ARM64",
        }
    }

    /// `ProcessorArchitecture` attribute of the AppX identity.
    pub fn appx_architecture(self) -> &'static str {
        match self {
            Arch::X86_64 => "x64",
            Arch::X86 => "x86",
            Arch::AArch64 => "arm64",
        }
    }
}
