//! Regions command - prints the known AWS regions

use std::io::Write;

use crate::domain::{AwsRegion, AWS_REGIONS};

pub fn run() -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write_regions(&mut stdout, AWS_REGIONS)?;
    Ok(())
}

fn write_regions(out: &mut impl Write, regions: &[AwsRegion]) -> std::io::Result<()> {
    let width = regions.iter().map(|r| r.name.len()).max().unwrap_or(0);

    for region in regions {
        writeln!(out, "{:width$}  {}", region.name, region.label, width = width)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_regions_aligns_labels() {
        let regions = [
            AwsRegion {
                name: "us-east-1",
                label: "US East (N. Virginia)",
            },
            AwsRegion {
                name: "ap-northeast-1",
                label: "Asia Pacific (Tokyo)",
            },
        ];

        let mut out = Vec::new();
        write_regions(&mut out, &regions).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "us-east-1       US East (N. Virginia)\nap-northeast-1  Asia Pacific (Tokyo)\n"
        );
    }
}
