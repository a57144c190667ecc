//! Bank-aware resolution of externally supplied memory snapshots.
//!
//! Emulators expose banked memory in different ways, so bank contents are
//! borrowed slices registered per frame rather than owned copies. When a
//! region has no registered banks, or a requested bank is missing, lookups
//! fall back to the CPU-mapped view of that region.

/// Size of one tile memory bank in bytes.
pub const VRAM_BANK_SIZE: usize = 8192;

/// Size of one ROM bank in bytes.
pub const ROM_BANK_SIZE: usize = 16384;

pub const MAX_VRAM_BANKS: usize = 2;
pub const MAX_ROM_BANKS: usize = 512;
pub const MAX_RAM_BANKS: usize = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum BankRegion {
    Vram,
    Rom,
    Ram,
}

/// Registry of borrowed bank slices, rebuilt by the frontend each frame.
#[derive(Default)]
pub struct BankRegistry<'a> {
    vram: [Option<&'a [u8]>; MAX_VRAM_BANKS],
    vram_provided: bool,
    rom: Vec<Option<&'a [u8]>>,
    ram: Vec<Option<&'a [u8]>>,
    ram_bank_size: usize,
}

impl<'a> BankRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one tile memory bank. The slice must be exactly
    /// [VRAM_BANK_SIZE] bytes and the bank index 0 or 1.
    pub fn set_vram_bank(&mut self, bank: usize, data: &'a [u8]) -> bool {
        if bank >= MAX_VRAM_BANKS {
            log::warn!("rejected VRAM bank {bank}, only {MAX_VRAM_BANKS} banks exist");
            return false;
        }
        if data.len() != VRAM_BANK_SIZE {
            log::warn!(
                "rejected VRAM bank {bank}: {} bytes, expected {VRAM_BANK_SIZE}",
                data.len()
            );
            return false;
        }
        self.vram[bank] = Some(data);
        self.vram_provided = true;
        true
    }

    pub fn clear_vram_banks(&mut self) {
        self.vram = [None; MAX_VRAM_BANKS];
        self.vram_provided = false;
    }

    /// Registers `count` ROM banks via a lookup function. Banks for which the
    /// lookup returns None or a wrongly sized slice are skipped and later
    /// fall back to mapped memory.
    pub fn set_rom_banks<F>(&mut self, count: usize, lookup: F) -> bool
    where
        F: Fn(usize) -> Option<&'a [u8]>,
    {
        if count == 0 || count > MAX_ROM_BANKS {
            log::warn!("rejected ROM bank count {count}, expected 1..={MAX_ROM_BANKS}");
            return false;
        }
        self.rom = (0..count)
            .map(|bank| {
                lookup(bank).filter(|data| {
                    if data.len() == ROM_BANK_SIZE {
                        true
                    } else {
                        log::warn!(
                            "skipping ROM bank {bank}: {} bytes, expected {ROM_BANK_SIZE}",
                            data.len()
                        );
                        false
                    }
                })
            })
            .collect();
        true
    }

    /// Registers `count` cartridge RAM banks of `bank_size` bytes each.
    /// A count of zero disables RAM banking.
    pub fn set_ram_banks<F>(&mut self, count: usize, bank_size: usize, lookup: F) -> bool
    where
        F: Fn(usize) -> Option<&'a [u8]>,
    {
        if count > MAX_RAM_BANKS {
            log::warn!("rejected RAM bank count {count}, expected 0..={MAX_RAM_BANKS}");
            return false;
        }
        self.ram = (0..count)
            .map(|bank| {
                lookup(bank).filter(|data| {
                    if data.len() == bank_size {
                        true
                    } else {
                        log::warn!(
                            "skipping RAM bank {bank}: {} bytes, expected {bank_size}",
                            data.len()
                        );
                        false
                    }
                })
            })
            .collect();
        self.ram_bank_size = bank_size;
        true
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    /// True if any banks were registered for the region.
    pub fn provided(&self, region: BankRegion) -> bool {
        match region {
            BankRegion::Vram => self.vram_provided,
            BankRegion::Rom => !self.rom.is_empty(),
            BankRegion::Ram => !self.ram.is_empty(),
        }
    }

    pub fn bank_count(&self, region: BankRegion) -> usize {
        match region {
            BankRegion::Vram => {
                if self.vram_provided {
                    MAX_VRAM_BANKS
                } else {
                    0
                }
            }
            BankRegion::Rom => self.rom.len(),
            BankRegion::Ram => self.ram.len(),
        }
    }

    pub fn bank(&self, region: BankRegion, index: usize) -> Option<&'a [u8]> {
        match region {
            BankRegion::Vram => self.vram.get(index).copied().flatten(),
            BankRegion::Rom => self.rom.get(index).copied().flatten(),
            BankRegion::Ram => self.ram.get(index).copied().flatten(),
        }
    }

    /// Resolves the data source for a region: the requested bank if it is
    /// registered, otherwise the mapped view. Regions with no registered
    /// banks always resolve to the mapped view.
    pub fn select_source<'b>(
        &'b self,
        region: BankRegion,
        requested: usize,
        mapped: &'b [u8],
    ) -> &'b [u8] {
        if !self.provided(region) {
            return mapped;
        }
        self.bank(region, requested).unwrap_or(mapped)
    }

    pub fn ram_bank_size(&self) -> usize {
        self.ram_bank_size
    }
}
