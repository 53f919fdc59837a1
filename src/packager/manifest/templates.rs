//! Handlebars templates for generated project files.

/// XcodeGen project spec for the iOS web view wrapper.
///
/// Values are pre-quoted by the caller; the template is rendered without
/// escaping.
pub const PROJECT_YML_TEMPLATE: &str = r#"name: {{target_name}}
options:
  bundleIdPrefix: {{bundle_id_prefix}}
  deploymentTarget:
    iOS: "{{deployment_target}}"
configFiles:
  Debug: Config.xcconfig
  Release: Config.xcconfig
targets:
  {{target_name}}:
    type: application
    platform: iOS
    sources:
      - Sources
      - Assets.xcassets
    info:
      path: Sources/Info.plist
      properties:
        CFBundleDisplayName: {{display_name}}
        CFBundleShortVersionString: $(MARKETING_VERSION)
        CFBundleVersion: $(CURRENT_PROJECT_VERSION)
        PWAStartURL: $(PWA_START_URL)
        PWAThemeColor: $(PWA_THEME_COLOR)
        UILaunchScreen:
          UIColorName: ""
        UISupportedInterfaceOrientations:
          - UIInterfaceOrientationPortrait
    settings:
      base:
        PRODUCT_BUNDLE_IDENTIFIER: {{bundle_id}}
        ASSETCATALOG_COMPILER_APPICON_NAME: AppIcon
        TARGETED_DEVICE_FAMILY: "1,2"
"#;

/// Build settings shared by every configuration of the iOS target.
pub const XCCONFIG_TEMPLATE: &str = r#"// Generated by pwa_packager. Do not edit.
MARKETING_VERSION = {{marketing_version}}
CURRENT_PROJECT_VERSION = {{build_version}}
PWA_START_URL = {{start_url}}
PWA_THEME_COLOR = {{theme_color}}
{{#if team_id}}
DEVELOPMENT_TEAM = {{team_id}}
{{/if}}
"#;

/// MSIX package manifest for the Windows web view wrapper.
///
/// Rendered with HTML escaping, which is valid for XML attribute and text
/// content.
pub const APPX_MANIFEST_TEMPLATE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Package
  xmlns="http://schemas.microsoft.com/appx/manifest/foundation/windows10"
  xmlns:uap="http://schemas.microsoft.com/appx/manifest/uap/windows10"
  xmlns:rescap="http://schemas.microsoft.com/appx/manifest/foundation/windows10/restrictedcapabilities"
  IgnorableNamespaces="uap rescap">

  <Identity
    Name="{{identity_name}}"
    Publisher="{{publisher}}"
    Version="{{version}}"
    ProcessorArchitecture="{{architecture}}" />

  <Properties>
    <DisplayName>{{display_name}}</DisplayName>
    <PublisherDisplayName>{{publisher_display_name}}</PublisherDisplayName>
    <Logo>Images\StoreLogo.png</Logo>
  </Properties>

  <Dependencies>
    <TargetDeviceFamily Name="Windows.Desktop" MinVersion="10.0.17763.0" MaxVersionTested="10.0.22621.0" />
  </Dependencies>

  <Resources>
    <Resource Language="x-generate" />
  </Resources>

  <Applications>
    <Application Id="App" Executable="$targetnametoken$.exe" EntryPoint="$targetentrypoint$">
      <uap:VisualElements
        DisplayName="{{display_name}}"
        Description="{{description}}"
        BackgroundColor="transparent"
        Square150x150Logo="Images\Square150x150Logo.png"
        Square44x44Logo="Images\Square44x44Logo.png">
        <uap:DefaultTile Wide310x150Logo="Images\Wide310x150Logo.png" />
        <uap:SplashScreen Image="Images\SplashScreen.png" BackgroundColor="{{background_color}}" />
      </uap:VisualElements>
    </Application>
  </Applications>

  <Capabilities>
    <Capability Name="internetClient" />
    <rescap:Capability Name="runFullTrust" />
  </Capabilities>
</Package>
"#;
