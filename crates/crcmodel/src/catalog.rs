//! Named CRC variants from the CRC Catalogue.
//!
//! Each entry carries its published check value (the CRC of `"123456789"`).
//! The reference engine verifies all of them at compile time.

use crate::params::CrcParams;

impl CrcParams {
  /// CRC-8/SMBUS - SMBus packet error checking.
  pub const CRC_8_SMBUS: Self = Self::known(8, 0x07, 0x00, false, false, 0x00);

  /// CRC-8/MAXIM-DALLAS - 1-Wire, iButton.
  pub const CRC_8_MAXIM_DALLAS: Self = Self::known(8, 0x31, 0x00, true, true, 0x00);

  /// CRC-16/IBM-3740 (CCITT-FALSE) - floppy disks, many embedded protocols.
  pub const CRC_16_IBM_3740: Self = Self::known(16, 0x1021, 0xFFFF, false, false, 0x0000);

  /// CRC-16/ARC - ARC archives, LHA.
  pub const CRC_16_ARC: Self = Self::known(16, 0x8005, 0x0000, true, true, 0x0000);

  /// CRC-16/KERMIT - Kermit, Bluetooth.
  pub const CRC_16_KERMIT: Self = Self::known(16, 0x1021, 0x0000, true, true, 0x0000);

  /// CRC-16/XMODEM - XMODEM, ZMODEM.
  pub const CRC_16_XMODEM: Self = Self::known(16, 0x1021, 0x0000, false, false, 0x0000);

  /// CRC-24/OPENPGP - OpenPGP ASCII armor.
  pub const CRC_24_OPENPGP: Self = Self::known(24, 0x86_4CFB, 0xB7_04CE, false, false, 0x00_0000);

  /// CRC-32/ISO-HDLC - Ethernet, gzip, PNG, zip.
  pub const CRC_32_ISO_HDLC: Self = Self::known(32, 0x04C1_1DB7, 0xFFFF_FFFF, true, true, 0xFFFF_FFFF);

  /// CRC-32/ISCSI (CRC-32C) - iSCSI, SCTP, ext4.
  pub const CRC_32_ISCSI: Self = Self::known(32, 0x1EDC_6F41, 0xFFFF_FFFF, true, true, 0xFFFF_FFFF);

  /// CRC-32/BZIP2 - bzip2, AAL5.
  pub const CRC_32_BZIP2: Self = Self::known(32, 0x04C1_1DB7, 0xFFFF_FFFF, false, false, 0xFFFF_FFFF);

  /// CRC-40/GSM - GSM control channels.
  pub const CRC_40_GSM: Self = Self::known(40, 0x00_0482_0009, 0x00_0000_0000, false, false, 0xFF_FFFF_FFFF);

  /// CRC-64/ECMA-182.
  pub const CRC_64_ECMA_182: Self = Self::known(64, 0x42F0_E1EB_A9EA_3693, 0, false, false, 0);

  /// CRC-64/XZ - xz, PostgreSQL.
  pub const CRC_64_XZ: Self = Self::known(64, 0x42F0_E1EB_A9EA_3693, u64::MAX, true, true, u64::MAX);

  /// CRC-64/NVME - NVMe end-to-end data protection.
  pub const CRC_64_NVME: Self = Self::known(64, 0xAD93_D235_94C9_3659, u64::MAX, true, true, u64::MAX);
}

/// A named catalogue algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
  /// Canonical catalogue name.
  pub name: &'static str,
  /// Other names the algorithm is known by.
  pub aliases: &'static [&'static str],
  pub params: CrcParams,
  /// Published CRC of `"123456789"`.
  pub check: u64,
}

impl CatalogEntry {
  /// Whether `name` is this entry's canonical name or one of its aliases,
  /// ignoring ASCII case.
  #[must_use]
  pub fn matches(&self, name: &str) -> bool {
    let name = name.trim();
    self.name.eq_ignore_ascii_case(name) || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
  }
}

/// Every named algorithm, narrowest first.
pub const ENTRIES: &[CatalogEntry] = &[
  CatalogEntry {
    name: "CRC-8/SMBUS",
    aliases: &["CRC-8"],
    params: CrcParams::CRC_8_SMBUS,
    check: 0xF4,
  },
  CatalogEntry {
    name: "CRC-8/MAXIM-DALLAS",
    aliases: &["CRC-8/MAXIM", "DOW-CRC"],
    params: CrcParams::CRC_8_MAXIM_DALLAS,
    check: 0xA1,
  },
  CatalogEntry {
    name: "CRC-16/IBM-3740",
    aliases: &["CRC-16/CCITT-FALSE", "CRC-16/AUTOSAR"],
    params: CrcParams::CRC_16_IBM_3740,
    check: 0x29B1,
  },
  CatalogEntry {
    name: "CRC-16/ARC",
    aliases: &["ARC", "CRC-16", "CRC-16/LHA", "CRC-IBM"],
    params: CrcParams::CRC_16_ARC,
    check: 0xBB3D,
  },
  CatalogEntry {
    name: "CRC-16/KERMIT",
    aliases: &["CRC-16/CCITT", "CRC-16/CCITT-TRUE", "KERMIT"],
    params: CrcParams::CRC_16_KERMIT,
    check: 0x2189,
  },
  CatalogEntry {
    name: "CRC-16/XMODEM",
    aliases: &["CRC-16/ACORN", "CRC-16/LTE", "XMODEM", "ZMODEM"],
    params: CrcParams::CRC_16_XMODEM,
    check: 0x31C3,
  },
  CatalogEntry {
    name: "CRC-24/OPENPGP",
    aliases: &["CRC-24"],
    params: CrcParams::CRC_24_OPENPGP,
    check: 0x21_CF02,
  },
  CatalogEntry {
    name: "CRC-32/ISO-HDLC",
    aliases: &["CRC-32", "CRC-32/ADCCP", "PKZIP"],
    params: CrcParams::CRC_32_ISO_HDLC,
    check: 0xCBF4_3926,
  },
  CatalogEntry {
    name: "CRC-32/ISCSI",
    aliases: &["CRC-32C", "CRC-32/CASTAGNOLI"],
    params: CrcParams::CRC_32_ISCSI,
    check: 0xE306_9283,
  },
  CatalogEntry {
    name: "CRC-32/BZIP2",
    aliases: &["CRC-32/AAL5", "CRC-32/DECT-B"],
    params: CrcParams::CRC_32_BZIP2,
    check: 0xFC89_1918,
  },
  CatalogEntry {
    name: "CRC-40/GSM",
    aliases: &[],
    params: CrcParams::CRC_40_GSM,
    check: 0xD4_164F_C646,
  },
  CatalogEntry {
    name: "CRC-64/ECMA-182",
    aliases: &["CRC-64"],
    params: CrcParams::CRC_64_ECMA_182,
    check: 0x6C40_DF5F_0B49_7347,
  },
  CatalogEntry {
    name: "CRC-64/XZ",
    aliases: &["CRC-64/GO-ECMA"],
    params: CrcParams::CRC_64_XZ,
    check: 0x995D_C9BB_DF19_39FA,
  },
  CatalogEntry {
    name: "CRC-64/NVME",
    aliases: &[],
    params: CrcParams::CRC_64_NVME,
    check: 0xAE8B_1486_0A79_9888,
  },
];

/// Look up an entry by canonical name or alias (ASCII case-insensitive).
///
/// ```
/// use crcmodel::catalog;
///
/// let entry = catalog::find("crc-16/ccitt-false").unwrap();
/// assert_eq!(entry.name, "CRC-16/IBM-3740");
/// assert_eq!(entry.params.check(), 0x29B1);
/// ```
#[must_use]
pub fn find(name: &str) -> Option<&'static CatalogEntry> {
  ENTRIES.iter().find(|entry| entry.matches(name))
}
