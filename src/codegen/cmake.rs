//! Emission of the generated project's `CMakeLists.txt`.

use super::fmt;

pub(crate) fn render(project_name: &str) -> String {
    let target = fmt::cmake_name(project_name);
    format!(
        r#"cmake_minimum_required(VERSION 3.16)
project({target} VERSION 1.0.0)

# Point JUCE_PATH at a JUCE checkout, e.g. -DJUCE_PATH=~/JUCE
if(NOT DEFINED JUCE_PATH)
    set(JUCE_PATH "$ENV{{JUCE_PATH}}")
endif()
add_subdirectory(${{JUCE_PATH}} juce)

juce_add_plugin({target}
    COMPANY_NAME "Pedalforge"
    PLUGIN_MANUFACTURER_CODE Pfrg
    PLUGIN_CODE Pfcp
    FORMATS VST3 Standalone
    PRODUCT_NAME "{project_name}")

juce_generate_juce_header({target})

target_sources({target} PRIVATE
    CircuitProcessor.h
    CircuitProcessor.cpp)

target_compile_definitions({target} PRIVATE
    JUCE_WEB_BROWSER=0
    JUCE_USE_CURL=0
    JUCE_VST3_CAN_REPLACE_VST2=0)

target_link_libraries({target} PRIVATE
    juce::juce_audio_utils
    juce::juce_dsp
    PUBLIC
    juce::juce_recommended_config_flags
    juce::juce_recommended_lto_flags
    juce::juce_recommended_warning_flags)

set_target_properties({target} PROPERTIES CXX_STANDARD 17)
"#
    )
}
