/// Translates octal transcriptions of PDP-11 programs to absolute loader images.
///
/// The steps are:
/// 1. **Preprocessing** - conditional inclusion with `#ifdef`/`#if`/`#else`/`#endif`
/// 2. **Classification** - recognizing directive and octal data lines
/// 3. **Emission** - accumulating bytes and framing absolute format blocks
pub mod translator;

/// Octal word dump utility
pub mod hexdump;
