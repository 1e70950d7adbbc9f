use std::io::Write;

use color_print::cformat;
use eyre::Result;

use genx_trade_desk::catalog::PRODUCTS;

pub fn print_catalog(output: &mut dyn Write) -> Result<()> {
    for product in PRODUCTS {
        writeln!(
            output,
            "{}",
            cformat!(
                "<bold>{:>2}</> {} <dim>({}, {})</>",
                product.id,
                product.name,
                product.category,
                product.origin
            )
        )?;
        for spec in product.specifications {
            writeln!(output, "     - {}", spec)?;
        }
    }
    Ok(())
}
